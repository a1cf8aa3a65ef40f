//! Sweep engine - runs every collector, matches and correlates findings.
//!
//! A sweep has two phases:
//!
//! 1. The address table is read and every catalog mDNS name is resolved.
//!    MAC and mDNS findings are produced here, and the host target list is
//!    derived (address-table IPs not already covered by a resolved name,
//!    then the resolved names, then any extra targets).
//! 2. Host probes (title, favicon, certificate) and USB descriptor queries
//!    run concurrently under a shared semaphore and optional rate limit.
//!
//! Findings flow through a channel into a single correlator task. The whole
//! run races a cancellation signal and the global deadline; when either
//! fires, in-flight probes are dropped and the findings received so far are
//! reported.

pub mod cancel;
mod probe;
pub mod rate_limiter;
pub mod report;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use rate_limiter::RateLimiter;
pub use report::{SweepOutcome, SweepReport};

use crate::catalog::IndicatorCatalog;
use crate::collector::{bounded, Collectors};
use crate::correlate::Correlator;
use crate::matcher::Observation;
use crate::types::{ArpEntry, Finding, SweepId, UsbId};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use probe::Observer;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

/// Default number of concurrent probes.
pub const DEFAULT_CONCURRENCY: usize = 12;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Futures buffered ahead of the semaphore.
const PROBE_BUFFER: usize = 1000;

/// Configuration for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub concurrency: usize,
    /// Limit applied to every collector call.
    pub timeout: Duration,
    /// Global limit for the whole sweep. `None` means no deadline.
    pub deadline: Option<Duration>,
    /// Probes per second. 0 means unlimited.
    pub rate_limit: u32,
    pub probe_network: bool,
    pub probe_usb: bool,
    pub probe_mdns: bool,
    /// Hosts probed in addition to the address-table entries.
    pub extra_targets: Vec<String>,
    pub show_progress: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            deadline: None,
            rate_limit: 0,
            probe_network: true,
            probe_usb: true,
            probe_mdns: true,
            extra_targets: Vec::new(),
            show_progress: false,
        }
    }
}

/// One unit of phase-two work.
#[derive(Debug, Clone)]
enum Job {
    Host(String),
    Usb(UsbId),
}

#[derive(Debug, Default)]
struct Counters {
    hosts_probed: AtomicUsize,
    usb_queries: AtomicUsize,
}

/// A configured sweep over one catalog and one set of collectors.
pub struct Sweep {
    catalog: Arc<IndicatorCatalog>,
    collectors: Collectors,
    config: SweepConfig,
    semaphore: Semaphore,
    limiter: Option<RateLimiter>,
}

impl Sweep {
    pub fn new(catalog: Arc<IndicatorCatalog>, collectors: Collectors, config: SweepConfig) -> Self {
        let semaphore = Semaphore::new(config.concurrency.max(1));
        let limiter = RateLimiter::new(config.rate_limit);
        Self {
            catalog,
            collectors,
            config,
            semaphore,
            limiter,
        }
    }

    /// Run the sweep to completion, cancellation or deadline.
    ///
    /// Never fails: collection errors are absorbed by the probes and the
    /// report always carries whatever findings were produced.
    pub async fn run(&self, mut cancel: CancelSignal) -> SweepReport {
        let id = SweepId::new();
        let started_at = Utc::now();
        let start = Instant::now();
        info!(sweep = %id.short(), "Sweep started");

        let (tx, mut rx) = mpsc::unbounded_channel::<Finding>();
        let correlator = tokio::spawn(async move {
            let mut correlator = Correlator::new();
            while let Some(finding) = rx.recv().await {
                correlator.push(finding);
            }
            correlator
        });

        let counters = Counters::default();
        let outcome = {
            let work = self.collect(Observer::new(&self.catalog, tx), &counters);
            tokio::select! {
                biased;
                _ = work => SweepOutcome::Completed,
                _ = cancel.cancelled() => SweepOutcome::Cancelled,
                _ = deadline(self.config.deadline) => SweepOutcome::DeadlineExceeded,
            }
        };

        match outcome {
            SweepOutcome::Completed => {}
            SweepOutcome::Cancelled => warn!("Sweep cancelled, reporting partial results"),
            SweepOutcome::DeadlineExceeded => {
                warn!("Sweep deadline exceeded, reporting partial results")
            }
        }

        // Every sender was owned by the dropped work future, so the
        // correlator task drains the channel and ends.
        let correlator = match correlator.await {
            Ok(correlator) => correlator,
            Err(e) => {
                error!(error = %e, "Correlator task failed");
                Correlator::new()
            }
        };
        if correlator.duplicates() > 0 {
            warn!(duplicates = correlator.duplicates(), "Conflicting duplicate findings were merged");
        }
        let findings = correlator.finish();

        let report = SweepReport {
            id,
            started_at,
            completed_at: Utc::now(),
            duration_ms: start.elapsed().as_millis() as u64,
            outcome,
            hosts_probed: counters.hosts_probed.load(Ordering::Relaxed),
            usb_queries: counters.usb_queries.load(Ordering::Relaxed),
            findings,
        };
        info!(
            sweep = %report.id.short(),
            outcome = %report.outcome,
            findings = report.findings.len(),
            duration_ms = report.duration_ms,
            "Sweep finished"
        );
        report
    }

    async fn collect(&self, observer: Observer<'_>, counters: &Counters) {
        let (entries, resolved) = tokio::join!(self.read_address_table(), self.resolve_names(&observer));

        if !entries.is_empty() {
            let count = observer.observe(Observation::AddressTable(entries.clone()));
            info!(entries = entries.len(), findings = count, "Address table matched");
        }

        let mut jobs: Vec<Job> = Vec::new();
        if self.config.probe_network && self.catalog.has_host_indicators() {
            jobs.extend(
                host_targets(&entries, &resolved, &self.config.extra_targets)
                    .into_iter()
                    .map(Job::Host),
            );
        }
        if self.config.probe_usb && self.collectors.usb.is_some() {
            jobs.extend(self.catalog.usb_ids().into_iter().map(Job::Usb));
        }
        if jobs.is_empty() {
            debug!("No probes to run");
            return;
        }

        let progress = self.progress_bar(jobs.len());
        let observer = &observer;
        let progress_ref = progress.as_ref();

        stream::iter(jobs)
            .map(|job| async move {
                let Ok(_permit) = self.semaphore.acquire().await else {
                    return;
                };
                if let Some(limiter) = &self.limiter {
                    limiter.wait().await;
                }

                let produced = self.run_job(&job, observer, counters).await;

                if let Some(pb) = progress_ref {
                    pb.inc(1);
                    if produced > 0 {
                        pb.set_message(format!("{} finding(s) from {}", produced, job.label()));
                    }
                }
            })
            .buffer_unordered(PROBE_BUFFER)
            .collect::<Vec<()>>()
            .await;

        if let Some(pb) = progress {
            pb.finish_with_message("Sweep complete");
        }
    }

    async fn run_job(&self, job: &Job, observer: &Observer<'_>, counters: &Counters) -> usize {
        let limit = self.config.timeout;
        match job {
            Job::Host(host) => {
                counters.hosts_probed.fetch_add(1, Ordering::Relaxed);
                debug!(host = %host, "Probing host");
                probe::probe_host(host, &self.collectors, limit, observer).await
            }
            Job::Usb(id) => {
                let Some(source) = self.collectors.usb.as_deref() else {
                    return 0;
                };
                counters.usb_queries.fetch_add(1, Ordering::Relaxed);
                debug!(%id, "Querying USB descriptors");
                probe::probe_usb(*id, source, limit, observer).await
            }
        }
    }

    async fn read_address_table(&self) -> Vec<ArpEntry> {
        if !self.config.probe_network {
            return Vec::new();
        }
        let entries = bounded(self.config.timeout, async {
            Ok(self.collectors.address_table.entries().await)
        })
        .await;
        match entries {
            Ok(entries) => {
                debug!(entries = entries.len(), "Address table read");
                entries
            }
            Err(e) => {
                warn!(error = %e, "Address table unavailable");
                Vec::new()
            }
        }
    }

    async fn resolve_names(&self, observer: &Observer<'_>) -> Vec<(String, Vec<IpAddr>)> {
        if !self.config.probe_network || !self.config.probe_mdns {
            return Vec::new();
        }
        let names = self.catalog.distinct_mdns_names();
        if names.is_empty() {
            return Vec::new();
        }

        let limit = self.config.timeout;
        let resolved: Vec<(String, Vec<IpAddr>)> = stream::iter(names)
            .map(|name| async move {
                let Ok(_permit) = self.semaphore.acquire().await else {
                    return (name, Vec::new());
                };
                let addresses = probe::probe_mdns(&name, &self.collectors, limit, observer).await;
                (name, addresses)
            })
            .buffer_unordered(PROBE_BUFFER)
            .filter(|(_, addresses)| std::future::ready(!addresses.is_empty()))
            .collect()
            .await;

        info!(resolved = resolved.len(), "mDNS names resolved");
        resolved
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    }
}

impl Job {
    fn label(&self) -> String {
        match self {
            Job::Host(host) => host.clone(),
            Job::Usb(id) => id.entity_id(),
        }
    }
}

async fn deadline(limit: Option<Duration>) {
    match limit {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending::<()>().await,
    }
}

/// Host probe targets, in order and without duplicates.
///
/// Address-table IPs that a resolved mDNS name already covers are replaced by
/// that name.
pub fn host_targets(
    entries: &[ArpEntry],
    resolved: &[(String, Vec<IpAddr>)],
    extra: &[String],
) -> Vec<String> {
    let covered: HashSet<IpAddr> = resolved
        .iter()
        .flat_map(|(_, addresses)| addresses.iter().copied())
        .collect();

    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| !covered.contains(&entry.ip))
        .map(|entry| entry.ip.to_string())
        .chain(resolved.iter().map(|(name, _)| name.clone()))
        .chain(extra.iter().map(|host| host.trim().to_string()))
        .filter(|host| !host.is_empty() && seen.insert(host.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: &str, mac: &str) -> ArpEntry {
        ArpEntry::new(ip.parse().unwrap(), mac)
    }

    #[test]
    fn test_host_targets_replace_resolved_addresses() {
        let entries = vec![
            entry("10.0.0.1", "00:11:22:33:44:55"),
            entry("10.0.0.2", "00:11:22:33:44:56"),
            entry("10.0.0.2", "00:11:22:33:44:57"),
        ];
        let resolved = vec![("kvm.local".to_string(), vec!["10.0.0.1".parse().unwrap()])];
        let extra = vec!["10.0.0.2".to_string(), "bmc.example".to_string()];

        assert_eq!(
            host_targets(&entries, &resolved, &extra),
            vec!["10.0.0.2", "kvm.local", "bmc.example"]
        );
    }

    #[test]
    fn test_host_targets_empty() {
        assert!(host_targets(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = SweepConfig::default();
        assert_eq!(config.concurrency, 12);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.deadline.is_none());
    }
}
