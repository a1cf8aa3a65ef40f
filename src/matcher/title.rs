//! HTTP page title matching.

use crate::types::{Confidence, Finding, SignalType};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Exact-match a fetched title against each vendor's title set.
///
/// No substring or case-insensitive comparison is performed; titles are
/// specific enough that an exact hit is treated as unambiguous.
pub fn match_title(
    host: &str,
    title: &str,
    titles: &BTreeMap<String, BTreeSet<String>>,
) -> Vec<Finding> {
    titles
        .iter()
        .filter(|(_, set)| set.contains(title))
        .map(|(vendor, _)| {
            info!(host = %host, vendor = %vendor, title = %title, "Page title match found");
            Finding::new(SignalType::HttpTitle, vendor.as_str(), host, title, Confidence::High)
        })
        .collect()
}
