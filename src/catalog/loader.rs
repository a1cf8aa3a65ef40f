//! Catalog file loading and validation.
//!
//! The on-disk layout mirrors the `indicators.yaml` format:
//!
//! ```yaml
//! network:
//!   mdns:
//!     Acme: ["acme-kvm.local"]
//!   mac_addresses:
//!     Acme:
//!       prefixes:
//!         - prefix: "aa:bb:cc"
//!           confidence: high
//! http:
//!   ssl:
//!     Acme: "Acme Corp"
//!   favicon:
//!     Acme: [-1234567]
//!   title:
//!     Acme: ["Acme KVM"]
//! usb:
//!   Acme:
//!     - vid: "1234"
//!       pid: "5678"
//!       manufacturer: "Acme"
//! ```
//!
//! Files ending in `.json` are read as JSON with the same structure.

use super::{IndicatorCatalog, MacPrefix, UsbDescriptor};
use crate::error::{CatalogError, CatalogResult};
use crate::types::{Confidence, UsbId};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up when no catalog path is given.
pub const DEFAULT_CATALOG_FILE: &str = "indicators.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCatalog {
    network: RawNetwork,
    http: RawHttp,
    usb: BTreeMap<String, Vec<RawUsbDevice>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNetwork {
    mdns: BTreeMap<String, Vec<String>>,
    mac_addresses: BTreeMap<String, RawPrefixGroup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPrefixGroup {
    prefixes: Vec<RawPrefix>,
}

#[derive(Debug, Deserialize)]
struct RawPrefix {
    prefix: String,
    confidence: String,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHttp {
    ssl: BTreeMap<String, String>,
    favicon: BTreeMap<String, Vec<i64>>,
    title: BTreeMap<String, Vec<String>>,
}

/// `vid`/`pid` are read as strings so the YAML scalar's original text is
/// kept: an unquoted `0x1234` or `0001` would otherwise be decoded as a
/// decimal integer before the hex parse sees it.
#[derive(Debug, Deserialize)]
struct RawUsbDevice {
    vid: String,
    pid: String,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
}

fn parse_usb_component(vendor: &str, text: &str) -> CatalogResult<u16> {
    UsbId::parse_component(text).ok_or_else(|| CatalogError::InvalidUsbId {
        vendor: vendor.to_string(),
        value: text.to_string(),
    })
}

impl IndicatorCatalog {
    /// Load a catalog from a YAML or JSON file.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let raw: RawCatalog = if is_json {
            serde_json::from_str(&content).map_err(|e| CatalogError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            parse_yaml(&content).map_err(|reason| CatalogError::ParseFailed {
                path: path.to_path_buf(),
                reason,
            })?
        };

        let catalog = Self::from_raw(raw)?;
        debug!(path = %path.display(), summary = ?catalog.summary(), "Loaded indicator catalog");
        Ok(catalog)
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml_str(content: &str) -> CatalogResult<Self> {
        let raw = parse_yaml(content).map_err(|reason| CatalogError::ParseFailed {
            path: PathBuf::from("<inline>"),
            reason,
        })?;
        Self::from_raw(raw)
    }

    /// Find the first existing catalog among `candidates`.
    pub fn locate(candidates: &[PathBuf]) -> CatalogResult<PathBuf> {
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                let searched: Vec<String> =
                    candidates.iter().map(|p| p.display().to_string()).collect();
                CatalogError::NotFound(searched.join(", "))
            })
    }

    fn from_raw(raw: RawCatalog) -> CatalogResult<Self> {
        let mut catalog = IndicatorCatalog::default();

        for (vendor, group) in raw.network.mac_addresses {
            let vendor = check_vendor(vendor)?;
            let mut prefixes = Vec::with_capacity(group.prefixes.len());
            for entry in group.prefixes {
                if !is_valid_prefix(&entry.prefix) {
                    return Err(CatalogError::InvalidMacPrefix {
                        vendor,
                        prefix: entry.prefix,
                    });
                }
                prefixes.push(MacPrefix {
                    prefix: normalize_prefix(&entry.prefix),
                    confidence: entry.confidence.parse::<Confidence>()?,
                    reference: non_empty(entry.reference),
                });
            }
            catalog.mac_prefixes.insert(vendor, prefixes);
        }

        for (vendor, names) in raw.network.mdns {
            let vendor = check_vendor(vendor)?;
            let names: Vec<String> = names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
            catalog.mdns_names.insert(vendor, names);
        }

        for (vendor, titles) in raw.http.title {
            let vendor = check_vendor(vendor)?;
            catalog
                .http_titles
                .insert(vendor, titles.into_iter().collect());
        }

        for (vendor, substring) in raw.http.ssl {
            let vendor = check_vendor(vendor)?;
            if substring.is_empty() {
                continue;
            }
            catalog.tls_substrings.insert(vendor, substring);
        }

        for (vendor, hashes) in raw.http.favicon {
            let vendor = check_vendor(vendor)?;
            let mut set = BTreeSet::new();
            for hash in hashes {
                set.insert(to_signed_hash(hash).ok_or_else(|| {
                    CatalogError::InvalidFaviconHash {
                        vendor: vendor.clone(),
                        value: hash,
                    }
                })?);
            }
            catalog.favicon_hashes.insert(vendor, set);
        }

        for (vendor, devices) in raw.usb {
            let vendor = check_vendor(vendor)?;
            let mut descriptors = Vec::with_capacity(devices.len());
            for device in devices {
                descriptors.push(UsbDescriptor {
                    id: UsbId::new(
                        parse_usb_component(&vendor, &device.vid)?,
                        parse_usb_component(&vendor, &device.pid)?,
                    ),
                    serial: non_empty(device.serial),
                    manufacturer: non_empty(device.manufacturer),
                });
            }
            catalog.usb_descriptors.insert(vendor, descriptors);
        }

        Ok(catalog)
    }
}

/// Candidate catalog locations, in lookup order.
///
/// The working directory comes first, then the user configuration directory.
pub fn default_search_paths(config_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CATALOG_FILE)];
    if let Some(dir) = config_dir {
        paths.push(dir.join(DEFAULT_CATALOG_FILE));
    }
    paths
}

fn parse_yaml(content: &str) -> Result<RawCatalog, String> {
    // An empty document deserializes to unit, not an empty mapping.
    if content.trim().is_empty() {
        return Ok(RawCatalog::default());
    }
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}

fn check_vendor(vendor: String) -> CatalogResult<String> {
    let trimmed = vendor.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::EmptyVendor);
    }
    Ok(trimmed.to_string())
}

/// Hashes outside the signed range are accepted in their unsigned form.
fn to_signed_hash(value: i64) -> Option<i32> {
    if let Ok(v) = i32::try_from(value) {
        return Some(v);
    }
    u32::try_from(value).ok().map(|v| v as i32)
}

fn is_valid_prefix(prefix: &str) -> bool {
    let prefix = prefix.trim();
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '-')
}

pub(crate) fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().replace('-', ":").to_ascii_lowercase()
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};

    const SAMPLE: &str = r#"
network:
  mdns:
    Acme: ["acme-kvm.local", " "]
  mac_addresses:
    Acme:
      prefixes:
        - prefix: "AA-BB-CC"
          confidence: high
          reference: "https://example.invalid/oui"
        - prefix: "aa:bb:cd"
          confidence: low
http:
  ssl:
    Acme: "Acme Corp"
  favicon:
    Beta: [12345, 4294967295]
  title:
    Acme: ["Acme KVM", "Acme Console"]
usb:
  Gamma:
    - vid: "1234"
      pid: "0x5678"
      manufacturer: "GammaCorp"
      serial: ""
    - vid: 1a2b
      pid: 0001
"#;

    #[test]
    fn test_parse_full_catalog() {
        let catalog = IndicatorCatalog::from_yaml_str(SAMPLE).unwrap();

        let prefixes = &catalog.mac_prefixes()["Acme"];
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[0].prefix, "aa:bb:cc");
        assert_eq!(prefixes[0].confidence, Confidence::High);
        assert!(prefixes[0].reference.is_some());

        assert_eq!(catalog.mdns_names()["Acme"], vec!["acme-kvm.local"]);
        assert!(catalog.http_titles()["Acme"].contains("Acme Console"));
        assert_eq!(catalog.tls_substrings()["Acme"], "Acme Corp");

        let hashes = &catalog.favicon_hashes()["Beta"];
        assert!(hashes.contains(&12345));
        assert!(hashes.contains(&-1));

        let usb = &catalog.usb_descriptors()["Gamma"];
        assert_eq!(usb[0].id, UsbId::new(0x1234, 0x5678));
        assert_eq!(usb[0].serial, None);
        assert_eq!(usb[0].manufacturer.as_deref(), Some("GammaCorp"));
        assert_eq!(usb[1].id, UsbId::new(0x1a2b, 0x0001));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let catalog = assert_ok!(IndicatorCatalog::from_yaml_str("http:\n  title:\n    X: [\"x\"]\n"));
        assert!(catalog.mac_prefixes().is_empty());
        assert!(catalog.usb_descriptors().is_empty());
        assert_eq!(catalog.summary().http_titles, 1);

        let empty = assert_ok!(IndicatorCatalog::from_yaml_str(""));
        assert_eq!(empty.summary().vendors, 0);
    }

    #[test]
    fn test_invalid_confidence_is_rejected() {
        let yaml = "network:\n  mac_addresses:\n    A:\n      prefixes:\n        - prefix: \"aa\"\n          confidence: certain\n";
        let err = assert_err!(IndicatorCatalog::from_yaml_str(yaml));
        assert!(matches!(err, CatalogError::InvalidConfidence(_)));
    }

    #[test]
    fn test_unquoted_hex_usb_ids_keep_their_text() {
        let catalog = assert_ok!(IndicatorCatalog::from_yaml_str(
            "usb:\n  Gamma:\n    - vid: 0x1234\n      pid: \"5678\"\n  Logi:\n    - vid: 0x046d\n      pid: 0xc52b\n    - vid: 1234\n      pid: 0001\n"
        ));
        assert_eq!(catalog.usb_descriptors()["Gamma"][0].id, UsbId::new(0x1234, 0x5678));
        let logi = &catalog.usb_descriptors()["Logi"];
        assert_eq!(logi[0].id, UsbId::new(0x046d, 0xc52b));
        assert_eq!(logi[1].id, UsbId::new(0x1234, 0x0001));
    }

    #[test]
    fn test_invalid_usb_id_is_rejected() {
        let yaml = "usb:\n  A:\n    - vid: \"xyz\"\n      pid: \"0001\"\n";
        let err = assert_err!(IndicatorCatalog::from_yaml_str(yaml));
        assert!(matches!(err, CatalogError::InvalidUsbId { .. }));
    }

    #[test]
    fn test_invalid_mac_prefix_is_rejected() {
        let yaml = "network:\n  mac_addresses:\n    A:\n      prefixes:\n        - prefix: \"zz:11\"\n          confidence: low\n";
        let err = assert_err!(IndicatorCatalog::from_yaml_str(yaml));
        assert!(matches!(err, CatalogError::InvalidMacPrefix { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = assert_err!(IndicatorCatalog::from_yaml_str("network: [unclosed"));
        assert!(matches!(err, CatalogError::ParseFailed { .. }));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"http": {{"title": {{"Acme": ["Acme KVM"]}}}}, "usb": {{"Gamma": [{{"vid": "1234", "pid": "5678"}}]}}}}"#
        )
        .unwrap();

        let catalog = IndicatorCatalog::load(file.path()).unwrap();
        assert!(catalog.http_titles()["Acme"].contains("Acme KVM"));
        assert_eq!(catalog.usb_ids(), vec![UsbId::new(0x1234, 0x5678)]);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = assert_err!(IndicatorCatalog::load(&dir.path().join("absent.yaml")));
        assert!(matches!(err, CatalogError::ReadFailed { .. }));
    }

    #[test]
    fn test_locate_prefers_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("second.yaml");
        fs::write(&second, "").unwrap();

        let found = IndicatorCatalog::locate(&[dir.path().join("first.yaml"), second.clone()]);
        assert_eq!(found.unwrap(), second);

        let missing = IndicatorCatalog::locate(&[dir.path().join("nope.yaml")]);
        assert!(matches!(missing, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_default_search_paths() {
        let paths = default_search_paths(Some(Path::new("/etc/spyglass")));
        assert_eq!(paths[0], PathBuf::from("indicators.yaml"));
        assert_eq!(paths[1], PathBuf::from("/etc/spyglass/indicators.yaml"));
    }
}
