//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::sweep::{SweepOutcome, SweepReport};
use crate::types::{Confidence, Finding};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a sweep report in human-readable plain text.
pub fn write_plain<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Sweep Results",
        style("Spyglass").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {}",
        style("Sweep ID:").bold(),
        style(report.id.short()).dim()
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Started:").bold(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    let outcome_style = match report.outcome {
        SweepOutcome::Completed => Style::new().green(),
        SweepOutcome::Cancelled | SweepOutcome::DeadlineExceeded => Style::new().yellow().bold(),
    };
    writeln!(
        out,
        "  {} {}",
        style("Outcome:").bold(),
        outcome_style.apply_to(report.outcome)
    )?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} hosts probed, {} USB queries in {:.2}s",
        style("Statistics:").bold(),
        report.hosts_probed,
        report.usb_queries,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} high, {} medium, {} low",
        style(report.count_at(Confidence::High)).green().bold(),
        style(report.count_at(Confidence::Medium)).yellow(),
        style(report.count_at(Confidence::Low)).dim()
    )?;
    writeln!(out)?;

    if report.findings.is_empty() {
        writeln!(out, "  {}", style("No indicators matched.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<22}  {:<12}  {:<16}  {:<6}  {}",
            style("ENTITY").bold(),
            style("SIGNAL").bold(),
            style("VENDOR").bold(),
            style("CONF").bold(),
            style("EVIDENCE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for finding in &report.findings {
            write_finding(out, finding)?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn write_finding<W: Write>(out: &mut W, finding: &Finding) -> io::Result<()> {
    let confidence_style = match finding.confidence() {
        Confidence::High => Style::new().green().bold(),
        Confidence::Medium => Style::new().yellow(),
        Confidence::Low => Style::new().dim(),
    };
    let evidence = finding.evidence().lines().next().unwrap_or_default();

    writeln!(
        out,
        "  {:<22}  {:<12}  {:<16}  {:<6}  {}",
        truncate_string(finding.entity(), 22),
        finding.signal().to_string(),
        truncate_string(finding.vendor(), 16),
        confidence_style.apply_to(finding.confidence().to_string()),
        style(truncate_string(evidence, 40)).dim()
    )
}

/// Print a header before the sweep begins.
pub fn print_sweep_header(catalog: &str, vendors: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Spyglass").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Catalog: {} ({} vendors)",
        style("•").dim(),
        style(catalog).white().bold(),
        vendors
    );
    println!("{} Sweeping local network and USB devices...", style("•").dim());
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding an ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
