//! Address-table entries and link-layer address normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// One (IP, MAC) pair observed on the local segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: IpAddr,
    /// Link-layer address as observed (normally already normalized).
    pub mac: String,
}

impl ArpEntry {
    pub fn new(ip: IpAddr, mac: impl Into<String>) -> Self {
        Self {
            ip,
            mac: mac.into(),
        }
    }
}

impl fmt::Display for ArpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.ip, self.mac)
    }
}

/// Normalize a textual MAC address to lowercase, colon-separated, zero-padded form.
///
/// Accepts `:` or `-` separators and octets of one or two hex digits
/// (BSD `arp` prints `e6:c0:b:4b:d:26`). Returns `None` for anything that
/// is not exactly six octets.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let octets: Vec<&str> = raw.trim().split([':', '-']).collect();
    if octets.len() != 6 {
        return None;
    }

    let mut normalized = Vec::with_capacity(6);
    for octet in octets {
        if octet.is_empty() || octet.len() > 2 {
            return None;
        }
        let value = u8::from_str_radix(octet, 16).ok()?;
        normalized.push(format!("{:02x}", value));
    }
    Some(normalized.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bsd_short_octets() {
        assert_eq!(
            normalize_mac("e6:c0:b:4b:d:26").as_deref(),
            Some("e6:c0:0b:4b:0d:26")
        );
    }

    #[test]
    fn test_normalize_windows_dashes() {
        assert_eq!(
            normalize_mac("00-15-5D-E8-BF-8B").as_deref(),
            Some("00:15:5d:e8:bf:8b")
        );
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert_eq!(normalize_mac("(incomplete)"), None);
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee"), None);
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:fff"), None);
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:gg"), None);
        assert_eq!(normalize_mac(""), None);
    }
}
