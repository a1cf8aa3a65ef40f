//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of sweep reports.
//! Every formatter writes to any `io::Write`, so reports can go to stdout or
//! to a file.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_info, print_success, print_sweep_header, print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::sweep::SweepReport;
use std::io::{self, Write};

/// Format a sweep report in the requested format.
pub fn write_report<W: Write>(out: &mut W, report: &SweepReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_plain(out, report),
        OutputFormat::Json => json_format::write_json(out, report),
        OutputFormat::Csv => csv_format::write_csv(out, report),
    }
}
