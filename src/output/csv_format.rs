//! CSV output formatting.

use crate::sweep::SweepReport;
use std::io::{self, Write};

/// Write one row per finding.
pub fn write_csv<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["entity_id", "signal_type", "vendor", "confidence", "evidence"])?;

    for finding in &report.findings {
        let signal = finding.signal().to_string();
        let confidence = finding.confidence().to_string();
        wtr.write_record([
            finding.entity(),
            signal.as_str(),
            finding.vendor(),
            confidence.as_str(),
            finding.evidence(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
