//! Merging matcher output into one deduplicated result set.
//!
//! Findings are keyed by their (entity, vendor, signal type) triple. When two
//! findings share a triple the stronger one is kept; on a tie the first one
//! seen stays. No fusion across signal types happens here.

use crate::types::{Finding, FindingKey};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Accumulates findings for one run.
#[derive(Debug, Default)]
pub struct Correlator {
    findings: HashMap<FindingKey, Finding>,
    duplicates: usize,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one finding.
    ///
    /// A second finding for the same triple with different evidence means a
    /// matcher produced something it should not have, so it is logged as a
    /// defect before the dedup rule resolves it. An identical re-delivery
    /// is merged quietly.
    pub fn push(&mut self, finding: Finding) {
        let key = finding.key();
        let Some(existing) = self.findings.get(&key) else {
            self.findings.insert(key, finding);
            return;
        };

        if existing == &finding {
            debug!(finding = %finding, "Merged identical finding");
            return;
        }

        self.duplicates += 1;
        warn!(
            entity = %key.entity,
            vendor = %key.vendor,
            signal = %key.signal,
            kept = %existing.confidence().max(finding.confidence()),
            "Duplicate finding for the same entity, vendor and signal"
        );

        if finding.confidence() > existing.confidence() {
            self.findings.insert(key, finding);
        }
    }

    /// Number of distinct findings held.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of conflicting duplicates resolved so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Consume the correlator, returning findings sorted by entity, signal and vendor.
    pub fn finish(self) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self.findings.into_values().collect();
        findings.sort_by(|a, b| {
            a.entity()
                .cmp(b.entity())
                .then(a.signal().cmp(&b.signal()))
                .then_with(|| a.vendor().cmp(b.vendor()))
        });
        findings
    }
}

impl Extend<Finding> for Correlator {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for finding in iter {
            self.push(finding);
        }
    }
}

/// Deduplicate a list of findings in one call.
pub fn correlate(findings: impl IntoIterator<Item = Finding>) -> Vec<Finding> {
    let mut correlator = Correlator::new();
    correlator.extend(findings);
    correlator.finish()
}
