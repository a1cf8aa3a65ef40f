//! The indicator catalog.
//!
//! A catalog maps vendor names to matching rules for each signal family.
//! It is built once by [`IndicatorCatalog::load`] (or the builder used in
//! tests) and is read-only afterwards, so it can be shared across every
//! concurrent probe behind an `Arc` without locking.

mod loader;

pub use loader::default_search_paths;

use crate::types::{Confidence, UsbId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A link-layer address prefix rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacPrefix {
    /// Lowercase, colon-separated prefix (may end mid-octet).
    pub prefix: String,
    pub confidence: Confidence,
    pub reference: Option<String>,
}

/// A USB descriptor rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDescriptor {
    pub id: UsbId,
    pub serial: Option<String>,
    pub manufacturer: Option<String>,
}

/// Vendor-keyed indicators for every signal family.
#[derive(Debug, Clone, Default)]
pub struct IndicatorCatalog {
    mac_prefixes: BTreeMap<String, Vec<MacPrefix>>,
    http_titles: BTreeMap<String, BTreeSet<String>>,
    tls_substrings: BTreeMap<String, String>,
    favicon_hashes: BTreeMap<String, BTreeSet<i32>>,
    usb_descriptors: BTreeMap<String, Vec<UsbDescriptor>>,
    mdns_names: BTreeMap<String, Vec<String>>,
}

impl IndicatorCatalog {
    /// Start building a catalog in code.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn mac_prefixes(&self) -> &BTreeMap<String, Vec<MacPrefix>> {
        &self.mac_prefixes
    }

    pub fn http_titles(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.http_titles
    }

    pub fn tls_substrings(&self) -> &BTreeMap<String, String> {
        &self.tls_substrings
    }

    pub fn favicon_hashes(&self) -> &BTreeMap<String, BTreeSet<i32>> {
        &self.favicon_hashes
    }

    pub fn usb_descriptors(&self) -> &BTreeMap<String, Vec<UsbDescriptor>> {
        &self.usb_descriptors
    }

    pub fn mdns_names(&self) -> &BTreeMap<String, Vec<String>> {
        &self.mdns_names
    }

    /// Distinct USB id pairs referenced by any vendor, in sorted order.
    pub fn usb_ids(&self) -> Vec<UsbId> {
        self.usb_descriptors
            .values()
            .flatten()
            .map(|d| d.id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct mDNS names referenced by any vendor, in sorted order.
    pub fn distinct_mdns_names(&self) -> Vec<String> {
        self.mdns_names
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether the catalog defines any host-probe indicators (title, TLS, favicon).
    pub fn has_host_indicators(&self) -> bool {
        !self.http_titles.is_empty()
            || !self.tls_substrings.is_empty()
            || !self.favicon_hashes.is_empty()
    }

    /// Count indicators per family.
    pub fn summary(&self) -> CatalogSummary {
        let mut vendors = BTreeSet::new();
        vendors.extend(self.mac_prefixes.keys());
        vendors.extend(self.http_titles.keys());
        vendors.extend(self.tls_substrings.keys());
        vendors.extend(self.favicon_hashes.keys());
        vendors.extend(self.usb_descriptors.keys());
        vendors.extend(self.mdns_names.keys());

        CatalogSummary {
            vendors: vendors.len(),
            mac_prefixes: self.mac_prefixes.values().map(Vec::len).sum(),
            http_titles: self.http_titles.values().map(BTreeSet::len).sum(),
            tls_substrings: self.tls_substrings.len(),
            favicon_hashes: self.favicon_hashes.values().map(BTreeSet::len).sum(),
            usb_descriptors: self.usb_descriptors.values().map(Vec::len).sum(),
            mdns_names: self.mdns_names.values().map(Vec::len).sum(),
        }
    }
}

/// Indicator counts per signal family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub vendors: usize,
    pub mac_prefixes: usize,
    pub http_titles: usize,
    pub tls_substrings: usize,
    pub favicon_hashes: usize,
    pub usb_descriptors: usize,
    pub mdns_names: usize,
}

/// Builder for [`IndicatorCatalog`].
///
/// Values are normalized the same way the file loader normalizes them.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: IndicatorCatalog,
}

impl CatalogBuilder {
    pub fn mac_prefix(mut self, vendor: &str, prefix: &str, confidence: Confidence) -> Self {
        self.catalog
            .mac_prefixes
            .entry(vendor.to_string())
            .or_default()
            .push(MacPrefix {
                prefix: loader::normalize_prefix(prefix),
                confidence,
                reference: None,
            });
        self
    }

    pub fn http_title(mut self, vendor: &str, title: &str) -> Self {
        self.catalog
            .http_titles
            .entry(vendor.to_string())
            .or_default()
            .insert(title.to_string());
        self
    }

    pub fn tls_substring(mut self, vendor: &str, substring: &str) -> Self {
        self.catalog
            .tls_substrings
            .insert(vendor.to_string(), substring.to_string());
        self
    }

    pub fn favicon_hash(mut self, vendor: &str, hash: i32) -> Self {
        self.catalog
            .favicon_hashes
            .entry(vendor.to_string())
            .or_default()
            .insert(hash);
        self
    }

    pub fn usb_descriptor(
        mut self,
        vendor: &str,
        id: UsbId,
        serial: Option<&str>,
        manufacturer: Option<&str>,
    ) -> Self {
        self.catalog
            .usb_descriptors
            .entry(vendor.to_string())
            .or_default()
            .push(UsbDescriptor {
                id,
                serial: loader::non_empty(serial.map(str::to_string)),
                manufacturer: loader::non_empty(manufacturer.map(str::to_string)),
            });
        self
    }

    pub fn mdns_name(mut self, vendor: &str, name: &str) -> Self {
        self.catalog
            .mdns_names
            .entry(vendor.to_string())
            .or_default()
            .push(name.trim().to_string());
        self
    }

    pub fn build(self) -> IndicatorCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndicatorCatalog {
        IndicatorCatalog::builder()
            .mac_prefix("Acme", "AA-BB-CC", Confidence::High)
            .mac_prefix("Acme", "aa:bb:cd", Confidence::Low)
            .http_title("Acme", "Acme KVM")
            .tls_substring("Acme", "Acme Corp")
            .favicon_hash("Beta", 12345)
            .usb_descriptor("Gamma", UsbId::new(0x1234, 0x5678), None, Some("GammaCorp"))
            .usb_descriptor("Delta", UsbId::new(0x1234, 0x5678), Some(""), None)
            .mdns_name("Acme", "acme.local")
            .build()
    }

    #[test]
    fn test_builder_normalizes_prefixes() {
        let catalog = sample();
        assert_eq!(catalog.mac_prefixes()["Acme"][0].prefix, "aa:bb:cc");
    }

    #[test]
    fn test_builder_drops_empty_substrings() {
        let catalog = sample();
        assert_eq!(catalog.usb_descriptors()["Delta"][0].serial, None);
    }

    #[test]
    fn test_usb_ids_are_distinct() {
        assert_eq!(sample().usb_ids(), vec![UsbId::new(0x1234, 0x5678)]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.vendors, 4);
        assert_eq!(summary.mac_prefixes, 2);
        assert_eq!(summary.usb_descriptors, 2);
        assert_eq!(summary.favicon_hashes, 1);
        assert_eq!(summary.mdns_names, 1);
    }
}
