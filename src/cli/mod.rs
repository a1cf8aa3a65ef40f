//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `spyglass sweep` - Fingerprint the local network and USB devices
//! - `spyglass catalog summary|mac|hash` - Inspect an indicator catalog
//! - `spyglass config show|init|path` - Manage settings

mod catalog;
mod config;
mod sweep;

pub use catalog::{CatalogAction, CatalogCommand};
pub use config::{ConfigAction, ConfigCommand};
pub use sweep::SweepCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Spyglass - indicator-driven LAN and USB device fingerprinting.
///
/// Spyglass reads the local address table, probes the hosts it finds over
/// HTTP and TLS, queries attached USB devices, and matches everything it sees
/// against a catalog of vendor indicators.
#[derive(Parser, Debug)]
#[command(name = "spyglass")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Identify LAN hosts and USB devices from vendor indicators", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "PATH", env = "SPYGLASS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fingerprint the local network and attached USB devices
    #[command(alias = "s")]
    Sweep(SweepCommand),

    /// Inspect the indicator catalog
    #[command(alias = "c")]
    Catalog(CatalogCommand),

    /// Manage settings
    Config(ConfigCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl OutputFormat {
    /// Parse a format name from settings, falling back to plain.
    pub fn from_setting(name: &str) -> Self {
        Self::from_str(name, true).unwrap_or_else(|_| {
            warn!(format = name, "Unknown output format in settings, using plain");
            Self::Plain
        })
    }
}

/// State shared by every command handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    /// `None` when no configuration directory could be determined.
    pub paths: Option<Paths>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Resolve paths and load settings for the given invocation.
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let paths = match Paths::resolve() {
            Ok(paths) => Some(paths),
            Err(e) => {
                debug!(error = %e, "No configuration directory");
                None
            }
        };

        let settings = match (&cli.config, &paths) {
            (Some(file), _) => AppSettings::load_from(file)?,
            (None, Some(paths)) => AppSettings::load(paths)?,
            (None, None) => AppSettings::default(),
        };

        Ok(Self {
            settings,
            paths,
            verbose: cli.verbose > 0,
            quiet: cli.quiet,
        })
    }
}
