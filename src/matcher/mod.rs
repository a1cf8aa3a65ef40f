//! Matchers: pure functions from one observation plus the catalog to findings.
//!
//! Every signal family has its own comparison rule and confidence policy:
//!
//! | Family        | Rule                                   | Confidence          |
//! |---------------|----------------------------------------|---------------------|
//! | MAC address   | case-insensitive prefix                | declared in catalog |
//! | HTTP title    | exact set membership                   | high                |
//! | Certificate   | literal substring, first vendor wins   | high                |
//! | Favicon       | MurmurHash3 of base64 body, set lookup | medium              |
//! | USB           | id presence, then serial/manufacturer  | low → medium → high |
//! | mDNS          | catalog name resolved                  | medium              |
//!
//! Observations form a closed enumeration; [`match_observation`] dispatches
//! on it so the sweep engine never needs to know which rule applies.

pub mod certificate;
pub mod favicon;
pub mod mac;
pub mod mdns;
pub mod title;
pub mod usb;

pub use favicon::favicon_hash;
pub use usb::UsbIdForm;

use crate::catalog::IndicatorCatalog;
use crate::types::{ArpEntry, Finding, UsbId};
use std::net::IpAddr;

/// Raw data collected for one entity and one signal family.
#[derive(Debug, Clone)]
pub enum Observation {
    /// The local address table.
    AddressTable(Vec<ArpEntry>),
    /// The `<title>` text fetched from a host.
    HttpTitle { host: String, title: String },
    /// Rendered certificate text from a TLS handshake.
    Certificate { host: String, text: String },
    /// Raw favicon bytes fetched from one origin of a host.
    Favicon {
        host: String,
        url: String,
        bytes: Vec<u8>,
    },
    /// Descriptor-source output for one USB id query.
    UsbDescriptor {
        id: UsbId,
        output: String,
        form: UsbIdForm,
    },
    /// A catalog mDNS name that resolved.
    MdnsName { name: String, addresses: Vec<IpAddr> },
}

impl Observation {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddressTable(_) => "address_table",
            Self::HttpTitle { .. } => "http_title",
            Self::Certificate { .. } => "certificate",
            Self::Favicon { .. } => "favicon",
            Self::UsbDescriptor { .. } => "usb",
            Self::MdnsName { .. } => "mdns",
        }
    }
}

/// Apply the matcher for the observation's signal family.
pub fn match_observation(observation: &Observation, catalog: &IndicatorCatalog) -> Vec<Finding> {
    match observation {
        Observation::AddressTable(entries) => mac::match_entries(entries, catalog.mac_prefixes()),
        Observation::HttpTitle { host, title } => {
            title::match_title(host, title, catalog.http_titles())
        }
        Observation::Certificate { host, text } => {
            certificate::match_certificate(host, text, catalog.tls_substrings())
                .into_iter()
                .collect()
        }
        Observation::Favicon { host, url, bytes } => {
            favicon::match_favicon(host, url, bytes, catalog.favicon_hashes())
        }
        Observation::UsbDescriptor { id, output, form } => {
            usb::match_descriptor(*id, output, *form, catalog.usb_descriptors())
        }
        Observation::MdnsName { name, addresses } => {
            mdns::match_name(name, addresses, catalog.mdns_names())
        }
    }
}
