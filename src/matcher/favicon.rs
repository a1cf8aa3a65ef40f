//! Favicon hash matching.
//!
//! Icons are identified by the hash popularised by internet-wide scanners:
//! the raw bytes are base64-encoded in MIME form (76-character lines, each
//! terminated by `\n`) and the encoded text is hashed with 32-bit
//! MurmurHash3, seed 0, read as a signed integer.

use crate::types::{Confidence, Finding, SignalType};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use tracing::{debug, info};

/// Line length used by MIME base64.
const MIME_LINE_LEN: usize = 76;

/// Compute the favicon hash of raw icon bytes.
pub fn favicon_hash(bytes: &[u8]) -> i32 {
    murmur3_signed(mime_base64(bytes).as_bytes())
}

/// Match one fetched favicon against each vendor's hash set.
///
/// Hash collisions are possible, so matches carry medium confidence.
pub fn match_favicon(
    host: &str,
    url: &str,
    bytes: &[u8],
    hashes: &BTreeMap<String, BTreeSet<i32>>,
) -> Vec<Finding> {
    let hash = favicon_hash(bytes);
    debug!(host = %host, url = %url, hash, "Computed favicon hash");

    hashes
        .iter()
        .filter(|(_, set)| set.contains(&hash))
        .map(|(vendor, _)| {
            info!(host = %host, vendor = %vendor, url = %url, hash, "Favicon hash match found");
            Finding::new(
                SignalType::Favicon,
                vendor.as_str(),
                host,
                hash.to_string(),
                Confidence::Medium,
            )
        })
        .collect()
}

fn mime_base64(bytes: &[u8]) -> String {
    let encoded = BASE64.encode(bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MIME_LINE_LEN + 1);
    for line in encoded.as_bytes().chunks(MIME_LINE_LEN) {
        // base64 output is pure ASCII
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out
}

fn murmur3_signed(data: &[u8]) -> i32 {
    // Reading from an in-memory cursor cannot fail.
    murmur3::murmur3_32(&mut Cursor::new(data), 0).unwrap_or_default() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndicatorCatalog;

    #[test]
    fn test_murmur3_reference_value() {
        assert_eq!(murmur3_signed(b"foo"), -156908512);
        assert_eq!(murmur3_signed(b""), 0);
    }

    #[test]
    fn test_mime_base64_wraps_lines() {
        assert_eq!(mime_base64(b"abc"), "YWJj\n");
        assert_eq!(mime_base64(b""), "");

        let encoded = mime_base64(&[0u8; 100]);
        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), MIME_LINE_LEN);
        assert!(encoded.ends_with('\n'));
    }

    #[test]
    fn test_hash_is_over_encoded_bytes() {
        assert_eq!(favicon_hash(b"abc"), murmur3_signed(b"YWJj\n"));
        assert_ne!(favicon_hash(b"abc"), murmur3_signed(b"abc"));
    }

    #[test]
    fn test_beta_scenario() {
        let icon = b"\x00\x00\x01\x00fake-icon-bytes";
        let hash = favicon_hash(icon);

        let catalog = IndicatorCatalog::builder().favicon_hash("Beta", hash).build();
        let findings = match_favicon("10.0.0.3", "http://10.0.0.3/favicon.ico", icon, catalog.favicon_hashes());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].vendor(), "Beta");
        assert_eq!(findings[0].signal(), SignalType::Favicon);
        assert_eq!(findings[0].confidence(), Confidence::Medium);
        assert_eq!(findings[0].evidence(), hash.to_string());

        let other = IndicatorCatalog::builder()
            .favicon_hash("Beta", hash.wrapping_add(1))
            .build();
        assert!(match_favicon("10.0.0.3", "u", icon, other.favicon_hashes()).is_empty());
    }
}
