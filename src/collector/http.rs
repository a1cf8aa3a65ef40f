//! HTTP retrieval for page titles and favicons.

use super::{url_host, HttpFetcher};
use crate::error::{CollectError, CollectResult};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

pub(crate) const USER_AGENT: &str = concat!("spyglass/", env!("CARGO_PKG_VERSION"));

/// Scheme and default port pairs tried for every host, in order.
pub const ORIGINS: &[(&str, u16)] = &[("http", 80), ("https", 443)];

/// reqwest-backed [`HttpFetcher`].
///
/// Certificate validation is disabled: embedded management interfaces almost
/// always present self-signed certificates.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> CollectResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> CollectResult<reqwest::Response> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "HTTP response");
        if !status.is_success() {
            return Err(CollectError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpFetcher for HttpClient {
    async fn fetch_page(&self, url: &Url) -> CollectResult<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &Url) -> CollectResult<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

/// Root URL of `host` for the given scheme.
pub fn origin_url(scheme: &str, host: &str) -> CollectResult<Url> {
    let raw = format!("{}://{}/", scheme, url_host(host));
    Url::parse(&raw).map_err(|e| CollectError::InvalidUrl(format!("{}: {}", raw, e)))
}
