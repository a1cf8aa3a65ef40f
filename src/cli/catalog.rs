//! Catalog subcommand implementation.
//!
//! Offline helpers for catalog authors: summarize a catalog, look up MAC
//! addresses against it, and compute favicon hashes.

use super::Context;
use crate::catalog::IndicatorCatalog;
use crate::config::catalog_candidates;
use crate::error::{CatalogError, CliError, CliResult};
use crate::matcher::{favicon_hash, mac};
use crate::output;
use crate::types::normalize_mac;
use clap::{Parser, Subcommand};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

/// Inspect the indicator catalog.
#[derive(Parser, Debug)]
pub struct CatalogCommand {
    /// Indicator catalog (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog actions.
#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Count indicators per signal family
    Summary,

    /// Show which vendors claim the given MAC addresses
    Mac {
        /// MAC addresses (colon or dash separated)
        #[arg(required = true)]
        macs: Vec<String>,
    },

    /// Compute the favicon hash of an icon file
    Hash {
        /// Icon file
        file: PathBuf,
    },
}

impl CatalogCommand {
    /// Execute the catalog command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            CatalogAction::Summary => {
                let (path, catalog) = self.load(ctx)?;
                print_summary(&path, &catalog);
                Ok(())
            }
            CatalogAction::Mac { macs } => {
                let (_, catalog) = self.load(ctx)?;
                lookup_macs(macs, &catalog);
                Ok(())
            }
            CatalogAction::Hash { file } => self.hash(file, ctx),
        }
    }

    fn load(&self, ctx: &Context) -> CliResult<(PathBuf, IndicatorCatalog)> {
        let candidates = catalog_candidates(self.catalog.as_deref(), &ctx.settings, ctx.paths.as_ref());
        let path = IndicatorCatalog::locate(&candidates)?;
        let catalog = IndicatorCatalog::load(&path)?;
        Ok((path, catalog))
    }

    fn hash(&self, file: &Path, ctx: &Context) -> CliResult<()> {
        let bytes = fs::read(file)?;
        let hash = favicon_hash(&bytes);
        println!("{}", hash);

        // Vendor lookup is best effort when no catalog was asked for.
        let catalog = match self.load(ctx) {
            Ok((_, catalog)) => catalog,
            Err(CliError::Catalog(CatalogError::NotFound(_))) if self.catalog.is_none() => {
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for (vendor, hashes) in catalog.favicon_hashes() {
            if hashes.contains(&hash) {
                output::print_info(&format!("matches {}", style(vendor).bold()));
            }
        }
        Ok(())
    }
}

fn print_summary(path: &Path, catalog: &IndicatorCatalog) {
    let summary = catalog.summary();
    println!("{} {}", style("Catalog:").bold(), path.display());
    println!("  {:<16} {}", "vendors", summary.vendors);
    println!("  {:<16} {}", "mac prefixes", summary.mac_prefixes);
    println!("  {:<16} {}", "http titles", summary.http_titles);
    println!("  {:<16} {}", "tls substrings", summary.tls_substrings);
    println!("  {:<16} {}", "favicon hashes", summary.favicon_hashes);
    println!("  {:<16} {}", "usb descriptors", summary.usb_descriptors);
    println!("  {:<16} {}", "mdns names", summary.mdns_names);
}

fn lookup_macs(macs: &[String], catalog: &IndicatorCatalog) {
    for raw in macs {
        let Some(normalized) = normalize_mac(raw) else {
            output::print_warning(&format!("'{}' is not a MAC address", raw));
            continue;
        };

        let rules = mac::rules_for(&normalized, catalog.mac_prefixes());
        if rules.is_empty() {
            println!("{}  {}", normalized, style("no match").dim());
            continue;
        }
        for (vendor, rule) in rules {
            let reference = rule
                .reference
                .as_deref()
                .map(|r| format!("  ({})", r))
                .unwrap_or_default();
            println!(
                "{}  {}  {}  {}{}",
                normalized,
                style(vendor).bold(),
                rule.prefix,
                rule.confidence,
                style(reference).dim()
            );
        }
    }
}
