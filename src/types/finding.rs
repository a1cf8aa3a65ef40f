//! Findings: one confidence-scored identification of one entity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Confidence;

/// The signal family a finding was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    MacAddress,
    HttpTitle,
    Certificate,
    Favicon,
    Usb,
    Mdns,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacAddress => write!(f, "mac_address"),
            Self::HttpTitle => write!(f, "http_title"),
            Self::Certificate => write!(f, "certificate"),
            Self::Favicon => write!(f, "favicon"),
            Self::Usb => write!(f, "usb"),
            Self::Mdns => write!(f, "mdns"),
        }
    }
}

/// A single identification result produced by one matcher.
///
/// Findings are immutable: all fields are private and only readable
/// through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(rename = "signal_type")]
    signal: SignalType,
    vendor: String,
    #[serde(rename = "entity_id")]
    entity: String,
    evidence: String,
    confidence: Confidence,
}

impl Finding {
    /// Create a new finding.
    pub fn new(
        signal: SignalType,
        vendor: impl Into<String>,
        entity: impl Into<String>,
        evidence: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            signal,
            vendor: vendor.into(),
            entity: entity.into(),
            evidence: evidence.into(),
            confidence,
        }
    }

    pub fn signal(&self) -> SignalType {
        self.signal
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// IP address, host name or USB id the finding is about.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The observed value that matched.
    pub fn evidence(&self) -> &str {
        &self.evidence
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// The (entity, vendor, signal) triple used for deduplication.
    pub fn key(&self) -> FindingKey {
        FindingKey {
            entity: self.entity.clone(),
            vendor: self.vendor.clone(),
            signal: self.signal,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} via {} ({} confidence)",
            self.entity, self.vendor, self.signal, self.confidence
        )
    }
}

/// Identity of a finding for merge purposes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FindingKey {
    pub entity: String,
    pub vendor: String,
    pub signal: SignalType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_type_serialization() {
        let json = serde_json::to_string(&SignalType::MacAddress).unwrap();
        assert_eq!(json, "\"mac_address\"");
        assert_eq!(SignalType::HttpTitle.to_string(), "http_title");
    }

    #[test]
    fn test_finding_serialization_field_names() {
        let finding = Finding::new(
            SignalType::Favicon,
            "Beta",
            "10.0.0.7",
            "12345",
            Confidence::Medium,
        );
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["signal_type"], "favicon");
        assert_eq!(value["entity_id"], "10.0.0.7");
        assert_eq!(value["confidence"], "medium");
    }

    #[test]
    fn test_finding_key_ignores_evidence_and_confidence() {
        let a = Finding::new(SignalType::Usb, "Gamma", "usb:1234:5678", "a", Confidence::Low);
        let b = Finding::new(SignalType::Usb, "Gamma", "usb:1234:5678", "b", Confidence::High);
        assert_eq!(a.key(), b.key());
    }
}
