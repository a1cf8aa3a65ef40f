//! Signal collectors.
//!
//! Each collector is a thin wrapper around an OS or network facility and is
//! exposed to the sweep engine through a trait, so tests (and other
//! front-ends) can substitute their own implementations. Collectors never
//! decide anything about vendors; they only hand raw data to the matchers.

pub mod arp;
pub mod html;
pub mod http;
pub mod mdns;
pub mod process;
pub mod tls;
pub mod usb;

pub use arp::SystemAddressTable;
pub use http::HttpClient;
pub use mdns::SystemResolver;
pub use tls::CertificateInspector;
pub use usb::{platform_descriptor_source, Ioreg, Lsusb};

use crate::error::{CollectError, CollectResult};
use crate::matcher::UsbIdForm;
use crate::types::{ArpEntry, UsbId};
use async_trait::async_trait;
use reqwest::Url;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Source of (IP, MAC) pairs for the local segment.
#[async_trait]
pub trait AddressTableSource: Send + Sync {
    /// Current address table. Failures yield an empty table.
    async fn entries(&self) -> Vec<ArpEntry>;
}

/// HTTP access for page and favicon retrieval.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Body of a successful (2xx) response.
    async fn fetch_page(&self, url: &Url) -> CollectResult<String>;

    /// Raw bytes of a successful (2xx) response.
    async fn fetch_bytes(&self, url: &Url) -> CollectResult<Vec<u8>>;
}

/// Certificate retrieval through a TLS handshake.
#[async_trait]
pub trait TlsInspector: Send + Sync {
    /// Human-readable certificate text presented by `host:port`.
    async fn inspect(&self, host: &str, port: u16) -> CollectResult<String>;
}

/// Platform-specific USB descriptor tool.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Platform name for logging.
    fn platform(&self) -> &'static str;

    /// How the tool prints vendor/product ids.
    fn id_form(&self) -> UsbIdForm;

    /// Descriptor text relevant to `id`. A nonzero exit is an error.
    async fn query(&self, id: UsbId) -> CollectResult<String>;
}

/// Host name resolution (used for mDNS `.local` names).
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> CollectResult<Vec<IpAddr>>;
}

/// The full set of collectors used by one sweep.
#[derive(Clone)]
pub struct Collectors {
    pub address_table: Arc<dyn AddressTableSource>,
    pub http: Arc<dyn HttpFetcher>,
    pub tls: Arc<dyn TlsInspector>,
    /// `None` when the platform has no supported descriptor tool.
    pub usb: Option<Arc<dyn DescriptorSource>>,
    pub resolver: Arc<dyn NameResolver>,
}

impl Collectors {
    /// Collectors backed by the host operating system and network.
    ///
    /// The USB descriptor source is chosen here, once, for the current platform.
    pub fn system(probe_timeout: Duration) -> CollectResult<Self> {
        Ok(Self {
            address_table: Arc::new(SystemAddressTable::new(probe_timeout)),
            http: Arc::new(HttpClient::new(probe_timeout)?),
            tls: Arc::new(CertificateInspector::new(probe_timeout)?),
            usb: platform_descriptor_source(probe_timeout),
            resolver: Arc::new(SystemResolver),
        })
    }
}

/// Run a collection attempt with a hard time limit.
///
/// Expiry is reported as [`CollectError::Timeout`]; the attempt's future is
/// dropped, which aborts it.
pub async fn bounded<T, F>(limit: Duration, attempt: F) -> CollectResult<T>
where
    F: Future<Output = CollectResult<T>>,
{
    match timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(CollectError::Timeout),
    }
}

/// Format a host for use inside a URL authority (brackets IPv6 literals).
pub fn url_host(host: &str) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
        _ => host.to_string(),
    }
}
