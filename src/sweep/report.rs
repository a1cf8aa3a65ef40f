//! Sweep results.

use crate::types::{Confidence, Finding, SweepId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// How a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Every probe finished.
    Completed,
    /// Stopped by an external cancellation request.
    Cancelled,
    /// Stopped by the global deadline.
    DeadlineExceeded,
}

impl fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepOutcome::Completed => write!(f, "completed"),
            SweepOutcome::Cancelled => write!(f, "cancelled"),
            SweepOutcome::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Consolidated output of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub id: SweepId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: SweepOutcome,
    /// Hosts whose HTTP/TLS probes were started.
    pub hosts_probed: usize,
    /// USB descriptor queries issued.
    pub usb_queries: usize,
    /// Deduplicated findings, sorted by entity, signal and vendor.
    pub findings: Vec<Finding>,
}

impl SweepReport {
    pub fn is_complete(&self) -> bool {
        self.outcome == SweepOutcome::Completed
    }

    pub fn count_at(&self, confidence: Confidence) -> usize {
        self.findings
            .iter()
            .filter(|f| f.confidence() == confidence)
            .count()
    }

    /// Distinct vendors with at least one finding.
    pub fn vendors(&self) -> BTreeSet<&str> {
        self.findings.iter().map(Finding::vendor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalType;

    fn report(outcome: SweepOutcome) -> SweepReport {
        let now = Utc::now();
        SweepReport {
            id: SweepId::new(),
            started_at: now,
            completed_at: now,
            duration_ms: 0,
            outcome,
            hosts_probed: 1,
            usb_queries: 0,
            findings: vec![
                Finding::new(SignalType::MacAddress, "Acme", "10.0.0.1", "aa:bb:cc:00:00:01", Confidence::High),
                Finding::new(SignalType::HttpTitle, "Acme", "10.0.0.1", "Acme KVM", Confidence::High),
                Finding::new(SignalType::Favicon, "Beta", "10.0.0.2", "12345", Confidence::Medium),
            ],
        }
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&SweepOutcome::DeadlineExceeded).unwrap();
        assert_eq!(json, "\"deadline_exceeded\"");
    }

    #[test]
    fn test_summary_helpers() {
        let report = report(SweepOutcome::Cancelled);
        assert!(!report.is_complete());
        assert_eq!(report.count_at(Confidence::High), 2);
        assert_eq!(report.vendors().into_iter().collect::<Vec<_>>(), vec!["Acme", "Beta"]);
    }
}
