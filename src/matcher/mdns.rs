//! mDNS host name matching.

use crate::types::{Confidence, Finding, SignalType};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::info;

/// Report every vendor that lists a name which resolved on the local network.
pub fn match_name(
    name: &str,
    addresses: &[IpAddr],
    names: &BTreeMap<String, Vec<String>>,
) -> Vec<Finding> {
    if addresses.is_empty() {
        return Vec::new();
    }

    let evidence = addresses
        .iter()
        .map(IpAddr::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    names
        .iter()
        .filter(|(_, listed)| listed.iter().any(|n| n.eq_ignore_ascii_case(name)))
        .map(|(vendor, _)| {
            info!(name = %name, vendor = %vendor, addresses = %evidence, "mDNS name resolved");
            Finding::new(SignalType::Mdns, vendor.as_str(), name, evidence.as_str(), Confidence::Medium)
        })
        .collect()
}
