//! Per-entity probes.
//!
//! Each probe turns collector output into observations and hands them to an
//! [`Observer`] as soon as they exist, so findings survive a sweep that is
//! stopped halfway through a host.

use crate::catalog::IndicatorCatalog;
use crate::collector::html::{favicon_url, page_title};
use crate::collector::http::{origin_url, ORIGINS};
use crate::collector::{bounded, Collectors, DescriptorSource};
use crate::matcher::{match_observation, Observation};
use crate::types::{Finding, UsbId};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

const TLS_PORT: u16 = 443;

/// Matches observations against the catalog and forwards the findings.
pub(crate) struct Observer<'a> {
    catalog: &'a IndicatorCatalog,
    sink: UnboundedSender<Finding>,
}

impl<'a> Observer<'a> {
    pub(crate) fn new(catalog: &'a IndicatorCatalog, sink: UnboundedSender<Finding>) -> Self {
        Self { catalog, sink }
    }

    pub(crate) fn catalog(&self) -> &IndicatorCatalog {
        self.catalog
    }

    /// Match one observation. Returns the number of findings produced.
    pub(crate) fn observe(&self, observation: Observation) -> usize {
        let findings = match_observation(&observation, self.catalog);
        trace!(kind = observation.kind(), findings = findings.len(), "Observation matched");
        let count = findings.len();
        for finding in findings {
            if self.sink.send(finding).is_err() {
                debug!("Finding sink closed, dropping finding");
            }
        }
        count
    }
}

/// Fetch title, favicons and certificate for one host.
///
/// HTTP origins are tried plaintext first. The first origin that yields a
/// title supplies it; favicons are taken from every origin that serves one.
/// The certificate is read concurrently with the HTTP work.
pub(crate) async fn probe_host(
    host: &str,
    collectors: &Collectors,
    limit: Duration,
    observer: &Observer<'_>,
) -> usize {
    let catalog = observer.catalog();
    let want_pages = !catalog.http_titles().is_empty() || !catalog.favicon_hashes().is_empty();
    let want_certificate = !catalog.tls_substrings().is_empty();

    let http = async {
        if want_pages {
            probe_origins(host, collectors, limit, observer).await
        } else {
            0
        }
    };
    let tls = async {
        if !want_certificate {
            return 0;
        }
        match bounded(limit, collectors.tls.inspect(host, TLS_PORT)).await {
            Ok(text) => observer.observe(Observation::Certificate {
                host: host.to_string(),
                text,
            }),
            Err(e) => {
                debug!(host, error = %e, "No certificate");
                0
            }
        }
    };

    let (from_http, from_tls) = tokio::join!(http, tls);
    from_http + from_tls
}

/// Fetch each origin in [`ORIGINS`] order.
///
/// The first page that answers 2xx is the only one whose title is matched,
/// even when it has no `<title>`. Favicons are fetched from every reachable
/// origin and all of them are matched.
async fn probe_origins(
    host: &str,
    collectors: &Collectors,
    limit: Duration,
    observer: &Observer<'_>,
) -> usize {
    let want_favicon = !observer.catalog().favicon_hashes().is_empty();
    let mut page_seen = false;
    let mut produced = 0;

    for &(scheme, _) in ORIGINS {
        let origin = match origin_url(scheme, host) {
            Ok(origin) => origin,
            Err(e) => {
                debug!(host, error = %e, "Cannot build origin URL");
                return produced;
            }
        };

        let body = match bounded(limit, collectors.http.fetch_page(&origin)).await {
            Ok(body) => Some(body),
            Err(e) if e.host_responded() => {
                debug!(url = %origin, error = %e, "Page fetch rejected");
                None
            }
            Err(e) => {
                debug!(url = %origin, error = %e, "Origin unreachable");
                continue;
            }
        };

        if let (false, Some(page)) = (page_seen, body.as_deref()) {
            page_seen = true;
            if let Some(title) = page_title(page) {
                produced += observer.observe(Observation::HttpTitle {
                    host: host.to_string(),
                    title,
                });
            }
        }

        if !want_favicon {
            continue;
        }
        let Some(icon) = favicon_url(&origin, body.as_deref()) else {
            continue;
        };
        match bounded(limit, collectors.http.fetch_bytes(&icon)).await {
            Ok(bytes) if bytes.is_empty() => debug!(url = %icon, "Empty favicon"),
            Ok(bytes) => {
                produced += observer.observe(Observation::Favicon {
                    host: host.to_string(),
                    url: icon.to_string(),
                    bytes,
                });
            }
            Err(e) => debug!(url = %icon, error = %e, "Favicon fetch failed"),
        }
    }

    produced
}

/// Query the descriptor source for one USB id.
pub(crate) async fn probe_usb(
    id: UsbId,
    source: &dyn DescriptorSource,
    limit: Duration,
    observer: &Observer<'_>,
) -> usize {
    match bounded(limit, source.query(id)).await {
        Ok(output) => observer.observe(Observation::UsbDescriptor {
            id,
            output,
            form: source.id_form(),
        }),
        Err(e) => {
            debug!(%id, platform = source.platform(), error = %e, "USB query produced no data");
            0
        }
    }
}

/// Resolve one catalog mDNS name. Returns the resolved addresses.
pub(crate) async fn probe_mdns(
    name: &str,
    collectors: &Collectors,
    limit: Duration,
    observer: &Observer<'_>,
) -> Vec<IpAddr> {
    match bounded(limit, collectors.resolver.resolve(name)).await {
        Ok(addresses) => {
            observer.observe(Observation::MdnsName {
                name: name.to_string(),
                addresses: addresses.clone(),
            });
            addresses
        }
        Err(e) => {
            debug!(name, error = %e, "mDNS name did not resolve");
            Vec::new()
        }
    }
}
