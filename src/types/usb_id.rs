//! USB vendor/product identifier pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A USB vendor id / product id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UsbId {
    pub vendor: u16,
    pub product: u16,
}

impl UsbId {
    pub fn new(vendor: u16, product: u16) -> Self {
        Self { vendor, product }
    }

    /// Parse a single hex id component such as `"1d6b"` or `"0x1D6B"`.
    pub fn parse_component(s: &str) -> Option<u16> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 4 {
            return None;
        }
        u16::from_str_radix(digits, 16).ok()
    }

    /// Entity identifier used in findings.
    pub fn entity_id(&self) -> String {
        format!("usb:{}", self)
    }
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_component() {
        assert_eq!(UsbId::parse_component("1234"), Some(0x1234));
        assert_eq!(UsbId::parse_component("0xABCD"), Some(0xabcd));
        assert_eq!(UsbId::parse_component("1"), Some(1));
        assert_eq!(UsbId::parse_component("12345"), None);
        assert_eq!(UsbId::parse_component("zz"), None);
        assert_eq!(UsbId::parse_component(""), None);
    }

    #[test]
    fn test_display_is_zero_padded_hex() {
        assert_eq!(UsbId::new(0x1d6b, 0x2).to_string(), "1d6b:0002");
        assert_eq!(UsbId::new(0x1234, 0x5678).entity_id(), "usb:1234:5678");
    }
}
