//! mDNS (`.local`) name resolution through the system resolver.

use super::NameResolver;
use crate::error::{CollectError, CollectResult};
use async_trait::async_trait;
use std::net::IpAddr;
use tokio::net::lookup_host;
use tracing::debug;

/// Resolves names with the operating system's resolver, which handles
/// `.local` names on hosts running Avahi or Bonjour.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, name: &str) -> CollectResult<Vec<IpAddr>> {
        let addresses = lookup_host((name, 0))
            .await
            .map_err(|e| {
                debug!(name, error = %e, "Name did not resolve");
                CollectError::Unresolved(name.to_string())
            })?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addresses {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }

        if ips.is_empty() {
            return Err(CollectError::Unresolved(name.to_string()));
        }
        Ok(ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_literal_address() {
        let ips = SystemResolver.resolve("127.0.0.1").await.unwrap();
        assert_eq!(ips, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }
}
