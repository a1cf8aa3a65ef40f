//! # Spyglass - Indicator-Driven Device Fingerprinting
//!
//! Spyglass identifies devices reachable from the local machine (LAN hosts
//! and attached USB peripherals) by collecting raw signals and matching them
//! against a declarative catalog of vendor indicators.
//!
//! ## Signals
//!
//! - **MAC prefixes** from the local address table
//! - **HTTP page titles** and **favicon hashes** from each host
//! - **TLS certificate text** from each host's HTTPS endpoint
//! - **USB descriptors** from `lsusb` (Linux) or `ioreg` (macOS)
//! - **mDNS names** resolved through the system resolver
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use spyglass::catalog::IndicatorCatalog;
//! use spyglass::collector::Collectors;
//! use spyglass::sweep::{CancelSignal, Sweep, SweepConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = IndicatorCatalog::load(Path::new("indicators.yaml"))?;
//! let config = SweepConfig::default();
//! let collectors = Collectors::system(config.timeout)?;
//!
//! let report = Sweep::new(Arc::new(catalog), collectors, config)
//!     .run(CancelSignal::never())
//!     .await;
//!
//! for finding in &report.findings {
//!     println!("{}", finding);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - The immutable indicator catalog and its YAML/JSON loader
//! - [`collector`] - Signal collectors behind async traits
//! - [`matcher`] - Pure matching functions, one per signal family
//! - [`correlate`] - Deduplication of findings
//! - [`sweep`] - Concurrent orchestration with timeouts, cancellation and a deadline
//! - [`config`] - Settings and catalog discovery
//! - [`output`] - Plain, JSON and CSV report formatting
//! - [`error`] - Error types

pub mod catalog;
pub mod cli;
pub mod collector;
pub mod config;
pub mod correlate;
pub mod error;
pub mod matcher;
pub mod output;
pub mod sweep;
pub mod types;

// Re-export commonly used types
pub use catalog::IndicatorCatalog;
pub use correlate::{correlate, Correlator};
pub use error::{CatalogError, CliError, CollectError};
pub use matcher::{match_observation, Observation};
pub use sweep::{Sweep, SweepConfig, SweepOutcome, SweepReport};
pub use types::{Confidence, Finding, SignalType, SweepId, UsbId};
