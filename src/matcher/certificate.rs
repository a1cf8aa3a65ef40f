//! TLS certificate substring matching.

use crate::types::{Confidence, Finding, SignalType};
use std::collections::BTreeMap;
use tracing::info;

/// Find the first vendor whose literal substring occurs in the certificate text.
///
/// At most one certificate finding is produced per host. Vendors are
/// checked in catalog (sorted) order.
pub fn match_certificate(
    host: &str,
    text: &str,
    substrings: &BTreeMap<String, String>,
) -> Option<Finding> {
    let (vendor, needle) = substrings
        .iter()
        .find(|(_, needle)| !needle.is_empty() && text.contains(needle.as_str()))?;

    info!(host = %host, vendor = %vendor, value = %needle, "SSL certificate match found");
    Some(Finding::new(
        SignalType::Certificate,
        vendor.as_str(),
        host,
        needle.as_str(),
        Confidence::High,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndicatorCatalog;

    const CERT: &str = "subject: CN=kvm.local\nissuer: C=CN, O=Acme Technologies, CN=Acme CA\n";

    #[test]
    fn test_substring_anywhere_matches() {
        let catalog = IndicatorCatalog::builder()
            .tls_substring("Acme", "Acme Technologies")
            .build();
        let finding = match_certificate("10.0.0.9", CERT, catalog.tls_substrings()).unwrap();
        assert_eq!(finding.vendor(), "Acme");
        assert_eq!(finding.confidence(), Confidence::High);
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let catalog = IndicatorCatalog::builder()
            .tls_substring("Acme", "acme technologies")
            .build();
        assert!(match_certificate("h", CERT, catalog.tls_substrings()).is_none());
    }

    #[test]
    fn test_first_vendor_wins() {
        let catalog = IndicatorCatalog::builder()
            .tls_substring("Beta", "CN=Acme")
            .tls_substring("Acme", "O=Acme")
            .build();
        let finding = match_certificate("h", CERT, catalog.tls_substrings()).unwrap();
        assert_eq!(finding.vendor(), "Acme");
    }
}
