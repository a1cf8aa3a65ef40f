//! TLS certificate retrieval and rendering.
//!
//! The handshake is performed by reqwest with `tls_info` enabled, which
//! exposes the peer's leaf certificate as DER. The DER is rendered into the
//! text the certificate matcher searches.

use super::http::USER_AGENT;
use super::{url_host, TlsInspector};
use crate::error::{CollectError, CollectResult};
use async_trait::async_trait;
use reqwest::tls::TlsInfo;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;

/// Shortest run of printable bytes kept when a certificate cannot be parsed.
const MIN_PRINTABLE_RUN: usize = 4;

/// Fetches the leaf certificate of an HTTPS endpoint.
#[derive(Debug, Clone)]
pub struct CertificateInspector {
    client: Client,
}

impl CertificateInspector {
    pub fn new(timeout: Duration) -> CollectResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .tls_info(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TlsInspector for CertificateInspector {
    async fn inspect(&self, host: &str, port: u16) -> CollectResult<String> {
        let raw = format!("https://{}:{}/", url_host(host), port);
        let url = Url::parse(&raw).map_err(|e| CollectError::InvalidUrl(format!("{}: {}", raw, e)))?;

        // Any HTTP status will do; only the handshake matters.
        let response = self.client.get(url).send().await?;
        let der = response
            .extensions()
            .get::<TlsInfo>()
            .and_then(TlsInfo::peer_certificate)
            .ok_or_else(|| CollectError::NoCertificate(host.to_string()))?;

        debug!(host, port, bytes = der.len(), "Peer certificate received");
        Ok(render_certificate(der))
    }
}

/// Render a DER certificate as `key: value` lines.
///
/// Falls back to the printable byte runs of the DER when parsing fails, so
/// vendor strings remain searchable either way.
pub fn render_certificate(der: &[u8]) -> String {
    let Ok((_, cert)) = parse_x509_certificate(der) else {
        debug!("Certificate did not parse, using printable bytes");
        return printable_runs(der);
    };

    let mut lines = vec![
        format!("subject: {}", cert.subject()),
        format!("issuer: {}", cert.issuer()),
        format!("serial: {}", cert.raw_serial_as_string()),
    ];

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for name in &san.value.general_names {
            match name {
                GeneralName::DNSName(dns) => lines.push(format!("dns: {}", dns)),
                GeneralName::RFC822Name(email) => lines.push(format!("email: {}", email)),
                _ => {}
            }
        }
    }

    lines.join("\n")
}

fn printable_runs(bytes: &[u8]) -> String {
    bytes
        .split(|b| !(b.is_ascii_graphic() || *b == b' '))
        .filter(|run| run.len() >= MIN_PRINTABLE_RUN)
        .map(|run| String::from_utf8_lossy(run).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_der_falls_back_to_printable_runs() {
        let mut der = vec![0x30, 0x82, 0x01];
        der.extend_from_slice(b"Acme Corp");
        der.extend_from_slice(&[0x00, 0x13, 0x02]);
        der.extend_from_slice(b"ab");
        der.push(0x05);
        der.extend_from_slice(b"Remote Console");
        let text = render_certificate(&der);
        assert!(text.contains("Acme Corp"));
        assert!(text.contains("Remote Console"));
        assert!(!text.contains("ab\n"));
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render_certificate(&[]), "");
    }

    #[test]
    fn test_inspector_builds() {
        assert!(CertificateInspector::new(Duration::from_secs(1)).is_ok());
    }
}
