//! Local address table collection.
//!
//! On Linux the kernel neighbour table is read straight from `/proc/net/arp`;
//! everywhere else (and as a fallback) the output of `arp -a` is parsed. Both
//! the BSD/Linux layout and the Windows layout are understood.

use super::process::run_command;
use super::AddressTableSource;
use crate::types::{normalize_mac, ArpEntry};
use async_trait::async_trait;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::{debug, warn};

const PROC_NET_ARP: &str = "/proc/net/arp";

/// Addresses that never belong to a device on the segment.
const EXCLUDED_ADDRESSES: &[IpAddr] = &[
    IpAddr::V4(Ipv4Addr::new(224, 0, 0, 251)),
    IpAddr::V4(Ipv4Addr::new(239, 255, 255, 250)),
    IpAddr::V4(Ipv4Addr::new(169, 254, 169, 254)),
    IpAddr::V4(Ipv4Addr::BROADCAST),
];

const BROADCAST_MAC: &str = "ff:ff:ff:ff:ff:ff";
const NULL_MAC: &str = "00:00:00:00:00:00";

/// Address table backed by the operating system.
#[derive(Debug, Clone)]
pub struct SystemAddressTable {
    timeout: Duration,
}

impl SystemAddressTable {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl AddressTableSource for SystemAddressTable {
    async fn entries(&self) -> Vec<ArpEntry> {
        if cfg!(target_os = "linux") {
            match tokio::fs::read_to_string(PROC_NET_ARP).await {
                Ok(content) => {
                    let entries = parse_proc_net_arp(&content);
                    if !entries.is_empty() {
                        return entries;
                    }
                    debug!("Kernel neighbour table is empty, trying arp -a");
                }
                Err(e) => debug!(error = %e, "Cannot read {}, trying arp -a", PROC_NET_ARP),
            }
        }

        match run_command("arp", &["-a"], self.timeout).await {
            Ok(output) if cfg!(windows) => parse_windows_arp(&output),
            Ok(output) => parse_unix_arp(&output),
            Err(e) => {
                warn!(error = %e, "Failed to read the address table");
                Vec::new()
            }
        }
    }
}

/// Parse the kernel's `/proc/net/arp` table.
///
/// ```text
/// IP address       HW type     Flags       HW address            Mask     Device
/// 192.168.1.1      0x1         0x2         00:11:22:33:44:55     *        eth0
/// ```
pub fn parse_proc_net_arp(content: &str) -> Vec<ArpEntry> {
    let mut table = Table::default();
    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        // Flags 0x0 marks an incomplete entry.
        if fields[2] == "0x0" {
            debug!(line, "Skipping incomplete neighbour entry");
            continue;
        }
        table.accept(fields[0], fields[3], line);
    }
    table.entries
}

/// Parse BSD/macOS/Linux `arp -a` output.
///
/// ```text
/// ? (192.168.68.56) at e6:c0:b:4b:d:26 on en0 ifscope [ethernet]
/// gateway (192.168.1.1) at 00:11:22:33:44:55 [ether] on eth0
/// ```
pub fn parse_unix_arp(output: &str) -> Vec<ArpEntry> {
    let mut table = Table::default();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 || fields[2] != "at" {
            warn!(line, "Unrecognized arp line");
            continue;
        }
        let ip = fields[1].trim_start_matches('(').trim_end_matches(')');
        let mac = fields[3];
        if mac.starts_with('(') || mac.starts_with('<') {
            debug!(line, "Skipping incomplete arp entry");
            continue;
        }
        table.accept(ip, mac, line);
    }
    table.entries
}

/// Parse Windows `arp -a` output.
///
/// ```text
/// Interface: 192.168.1.10 --- 0xb
///   Internet Address      Physical Address      Type
///   192.168.1.1           00-11-22-33-44-55     dynamic
/// ```
pub fn parse_windows_arp(output: &str) -> Vec<ArpEntry> {
    let mut table = Table::default();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("Interface:")
            || trimmed.starts_with("Internet Address")
        {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 2 {
            warn!(line, "Unrecognized arp line");
            continue;
        }
        table.accept(fields[0], fields[1], line);
    }
    table.entries
}

/// Whether an entry should be dropped before matching.
pub fn is_excluded(ip: &IpAddr, mac: &str) -> bool {
    ip.is_multicast() || EXCLUDED_ADDRESSES.contains(ip) || mac == BROADCAST_MAC || mac == NULL_MAC
}

/// Accumulates validated, deduplicated entries in observation order.
#[derive(Default)]
struct Table {
    entries: Vec<ArpEntry>,
    seen: HashSet<(IpAddr, String)>,
}

impl Table {
    fn accept(&mut self, ip: &str, mac: &str, line: &str) {
        let Ok(ip) = ip.parse::<IpAddr>() else {
            warn!(line, "Unparseable IP address in address table");
            return;
        };
        let Some(mac) = normalize_mac(mac) else {
            warn!(line, "Unparseable MAC address in address table");
            return;
        };
        if is_excluded(&ip, &mac) {
            debug!(%ip, %mac, "Excluded address table entry");
            return;
        }
        if self.seen.insert((ip, mac.clone())) {
            self.entries.push(ArpEntry::new(ip, mac));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_macos_output() {
        let output = "\
? (192.168.68.1) at 0:11:22:33:44:55 on en0 ifscope [ethernet]
? (192.168.68.56) at e6:c0:b:4b:d:26 on en0 ifscope [ethernet]
? (192.168.68.99) at (incomplete) on en0 ifscope [ethernet]
? (224.0.0.251) at 1:0:5e:0:0:fb on en0 ifscope permanent [ethernet]
";
        let entries = parse_unix_arp(output);
        assert_eq!(
            entries,
            vec![
                ArpEntry::new(ip("192.168.68.1"), "00:11:22:33:44:55"),
                ArpEntry::new(ip("192.168.68.56"), "e6:c0:0b:4b:0d:26"),
            ]
        );
    }

    #[test]
    fn test_parse_linux_arp_output() {
        let output = "gateway (192.168.1.1) at 00:11:22:33:44:55 [ether] on eth0\n\
                      ? (192.168.1.7) at <incomplete> on eth0\n";
        let entries = parse_unix_arp(output);
        assert_eq!(entries, vec![ArpEntry::new(ip("192.168.1.1"), "00:11:22:33:44:55")]);
    }

    #[test]
    fn test_parse_windows_output() {
        let output = "
Interface: 192.168.1.10 --- 0xb
  Internet Address      Physical Address      Type
  192.168.1.1           00-11-22-33-44-55     dynamic
  192.168.1.255         ff-ff-ff-ff-ff-ff     static
  239.255.255.250       01-00-5e-7f-ff-fa     static
";
        let entries = parse_windows_arp(output);
        assert_eq!(entries, vec![ArpEntry::new(ip("192.168.1.1"), "00:11:22:33:44:55")]);
    }

    #[test]
    fn test_parse_proc_net_arp() {
        let content = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         00:11:22:33:44:55     *        eth0
192.168.1.9      0x1         0x0         00:00:00:00:00:00     *        eth0
192.168.1.20     0x1         0x2         AA:BB:CC:DD:EE:FF     *        eth0
";
        let entries = parse_proc_net_arp(content);
        assert_eq!(
            entries,
            vec![
                ArpEntry::new(ip("192.168.1.1"), "00:11:22:33:44:55"),
                ArpEntry::new(ip("192.168.1.20"), "aa:bb:cc:dd:ee:ff"),
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let output = "garbage line here\n? (not-an-ip) at 00:11:22:33:44:55 on en0\n? (10.0.0.1) at zz:11 on en0\n";
        assert!(parse_unix_arp(output).is_empty());
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let output = "? (10.0.0.1) at 0:11:22:33:44:55 on en0\n? (10.0.0.1) at 00:11:22:33:44:55 on en1\n";
        assert_eq!(parse_unix_arp(output).len(), 1);
    }

    #[test]
    fn test_exclusions() {
        assert!(is_excluded(&ip("169.254.169.254"), "00:11:22:33:44:55"));
        assert!(is_excluded(&ip("10.0.0.1"), BROADCAST_MAC));
        assert!(!is_excluded(&ip("10.0.0.1"), "00:11:22:33:44:55"));
    }
}
