//! Link-layer address prefix matching.

use crate::catalog::MacPrefix;
use crate::types::{ArpEntry, Finding, SignalType};
use std::collections::BTreeMap;
use tracing::info;

/// Match every observed address against every vendor prefix.
///
/// All positive pairs are reported, so one MAC matching prefixes of two
/// vendors yields two findings. The confidence is the one declared in the
/// catalog for the matching prefix.
pub fn match_entries(
    entries: &[ArpEntry],
    prefixes: &BTreeMap<String, Vec<MacPrefix>>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for entry in entries {
        for (vendor, rule) in rules_for(&entry.mac, prefixes) {
            info!(mac = %entry.mac, ip = %entry.ip, vendor = %vendor, "Matched MAC prefix");
            findings.push(Finding::new(
                SignalType::MacAddress,
                vendor,
                entry.ip.to_string(),
                entry.mac.as_str(),
                rule.confidence,
            ));
        }
    }

    findings
}

/// Every (vendor, rule) pair whose prefix the address starts with, in catalog order.
pub fn rules_for<'a>(
    mac: &str,
    prefixes: &'a BTreeMap<String, Vec<MacPrefix>>,
) -> Vec<(&'a str, &'a MacPrefix)> {
    let mac = mac.to_lowercase();
    prefixes
        .iter()
        .flat_map(|(vendor, rules)| rules.iter().map(move |rule| (vendor.as_str(), rule)))
        .filter(|(_, rule)| mac.starts_with(&rule.prefix.to_lowercase()))
        .collect()
}
