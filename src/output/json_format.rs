//! JSON output formatting.

use crate::sweep::SweepReport;
use std::io::{self, Write};

/// Write the full report as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::other)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::SweepOutcome;
    use crate::types::{Confidence, Finding, SignalType, SweepId};
    use chrono::Utc;

    #[test]
    fn test_json_field_names() {
        let report = SweepReport {
            id: SweepId::new(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            duration_ms: 42,
            outcome: SweepOutcome::Completed,
            hosts_probed: 1,
            usb_queries: 0,
            findings: vec![Finding::new(
                SignalType::HttpTitle,
                "Acme",
                "10.0.0.1",
                "Acme KVM",
                Confidence::High,
            )],
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["findings"][0]["signal_type"], "http_title");
        assert_eq!(value["findings"][0]["entity_id"], "10.0.0.1");
        assert_eq!(value["findings"][0]["confidence"], "high");
    }
}
