//! Sweep subcommand implementation.
//!
//! Handles the `spyglass sweep` command.

use super::{Context, OutputFormat};
use crate::catalog::IndicatorCatalog;
use crate::collector::Collectors;
use crate::config::catalog_candidates;
use crate::error::CliResult;
use crate::output;
use crate::sweep::{CancelSignal, Sweep, SweepConfig, SweepReport};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fingerprint the local network and attached USB devices.
#[derive(Parser, Debug)]
pub struct SweepCommand {
    /// Indicator catalog (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Maximum number of concurrent probes
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Per-call timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Whole-sweep deadline in seconds (0 = none)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Rate limit in probes per second (0 = unlimited)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Write results to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Additional host to probe (repeatable)
    #[arg(long = "target", value_name = "HOST")]
    pub targets: Vec<String>,

    /// Skip the address table, mDNS and host probes
    #[arg(long)]
    pub no_network: bool,

    /// Skip USB descriptor queries
    #[arg(long)]
    pub no_usb: bool,

    /// Skip mDNS name resolution
    #[arg(long)]
    pub no_mdns: bool,
}

impl SweepCommand {
    /// Execute the sweep command.
    pub async fn execute(&self, ctx: &Context, cancel: CancelSignal) -> CliResult<()> {
        let candidates = catalog_candidates(self.catalog.as_deref(), &ctx.settings, ctx.paths.as_ref());
        let catalog_path = IndicatorCatalog::locate(&candidates)?;
        let catalog = IndicatorCatalog::load(&catalog_path)?;
        let summary = catalog.summary();
        info!(path = %catalog_path.display(), vendors = summary.vendors, "Catalog loaded");

        let format = self
            .output
            .unwrap_or_else(|| OutputFormat::from_setting(&ctx.settings.default_output_format));
        let config = self.sweep_config(ctx);

        if !ctx.quiet && format == OutputFormat::Plain && self.output_file.is_none() {
            output::print_sweep_header(&catalog_path.display().to_string(), summary.vendors);
        }

        let collectors = Collectors::system(config.timeout)?;
        let sweep = Sweep::new(Arc::new(catalog), collectors, config);
        let report = sweep.run(cancel).await;

        self.emit(&report, format, ctx)?;

        if !report.is_complete() && !ctx.quiet {
            output::print_warning(&format!(
                "Sweep {}; results are partial.",
                report.outcome
            ));
        }

        Ok(())
    }

    /// Merge command-line flags over settings.
    pub fn sweep_config(&self, ctx: &Context) -> SweepConfig {
        let settings = &ctx.settings;
        let deadline_secs = self.deadline.unwrap_or(settings.deadline_secs);

        SweepConfig {
            concurrency: self.concurrency.unwrap_or(settings.concurrency).max(1),
            timeout: self
                .timeout
                .map(Duration::from_millis)
                .unwrap_or_else(|| settings.timeout()),
            deadline: (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs)),
            rate_limit: self.rate_limit.unwrap_or(settings.rate_limit),
            probe_network: settings.probe_network && !self.no_network,
            probe_usb: settings.probe_usb && !self.no_usb,
            probe_mdns: settings.probe_mdns && !self.no_mdns,
            extra_targets: self.targets.clone(),
            show_progress: ctx.verbose && !ctx.quiet,
        }
    }

    fn emit(&self, report: &SweepReport, format: OutputFormat, ctx: &Context) -> CliResult<()> {
        match &self.output_file {
            Some(path) => {
                let mut out = BufWriter::new(File::create(path)?);
                output::write_report(&mut out, report, format)?;
                out.flush()?;
                if !ctx.quiet {
                    output::print_success(&format!(
                        "{} findings written to {}",
                        report.findings.len(),
                        path.display()
                    ));
                }
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                output::write_report(&mut out, report, format)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::AppSettings;

    fn context(settings: AppSettings) -> Context {
        Context {
            settings,
            paths: None,
            verbose: false,
            quiet: true,
        }
    }

    fn parse(args: &[&str]) -> SweepCommand {
        let mut argv = vec!["spyglass", "sweep"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Sweep(cmd) => cmd,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_settings_apply_when_flags_absent() {
        let settings = AppSettings {
            concurrency: 7,
            rate_limit: 5,
            deadline_secs: 0,
            probe_usb: false,
            ..AppSettings::default()
        };
        let config = parse(&[]).sweep_config(&context(settings));
        assert_eq!(config.concurrency, 7);
        assert_eq!(config.rate_limit, 5);
        assert_eq!(config.deadline, None);
        assert!(!config.probe_usb);
        assert!(config.probe_network);
    }

    #[test]
    fn test_flags_override_settings() {
        let config = parse(&["-c", "2", "-t", "500", "--deadline", "9", "--no-mdns"])
            .sweep_config(&context(AppSettings::default()));
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.deadline, Some(Duration::from_secs(9)));
        assert!(!config.probe_mdns);
    }
}
