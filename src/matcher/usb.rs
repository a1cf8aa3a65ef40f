//! USB descriptor matching with confidence escalation.

use crate::catalog::UsbDescriptor;
use crate::types::{Confidence, Finding, SignalType, UsbId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// How a platform's descriptor tool prints vendor/product ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbIdForm {
    /// `1d6b:0002`, as printed by `lsusb`.
    HexPair,
    /// `"idVendor" = 7531` and `"idProduct" = 2`, as printed by `ioreg`.
    DecimalFields,
}

impl UsbIdForm {
    /// Literal presence test for `id` in the tool's output.
    pub fn is_present(self, id: UsbId, output: &str) -> bool {
        match self {
            Self::HexPair => contains_token(
                &output.to_ascii_lowercase(),
                &id.to_string(),
                |c| c.is_ascii_hexdigit(),
            ),
            Self::DecimalFields => {
                let is_digit = |c: char| c.is_ascii_digit();
                contains_token(output, &format!("\"idVendor\" = {}", id.vendor), is_digit)
                    && contains_token(output, &format!("\"idProduct\" = {}", id.product), is_digit)
            }
        }
    }
}

/// Confidence for one catalog entry whose id is present in `output`.
///
/// Starts at low; a serial hit raises it to medium; a manufacturer hit
/// raises it to high and always wins over the serial.
pub fn escalate(descriptor: &UsbDescriptor, output: &str) -> Confidence {
    let mut confidence = Confidence::Low;
    if descriptor
        .serial
        .as_deref()
        .is_some_and(|serial| output.contains(serial))
    {
        confidence = Confidence::Medium;
    }
    if descriptor
        .manufacturer
        .as_deref()
        .is_some_and(|manufacturer| output.contains(manufacturer))
    {
        confidence = Confidence::High;
    }
    confidence
}

/// Match descriptor output for `id` against every catalog entry with that id.
///
/// Yields at most one finding per vendor.
pub fn match_descriptor(
    id: UsbId,
    output: &str,
    form: UsbIdForm,
    descriptors: &BTreeMap<String, Vec<UsbDescriptor>>,
) -> Vec<Finding> {
    if !form.is_present(id, output) {
        debug!(id = %id, "USB id not present in descriptor output");
        return Vec::new();
    }

    let mut findings = Vec::new();
    for (vendor, entries) in descriptors {
        // Several entries of one vendor can share an id; the strongest one speaks.
        let Some(confidence) = entries
            .iter()
            .filter(|d| d.id == id)
            .map(|d| escalate(d, output))
            .max()
        else {
            continue;
        };
        info!(id = %id, vendor = %vendor, confidence = %confidence, "Matched USB device");
        findings.push(Finding::new(
            SignalType::Usb,
            vendor.as_str(),
            id.entity_id(),
            output,
            confidence,
        ));
    }
    findings
}

/// Whether `needle` occurs in `haystack` without a token character on either side.
fn contains_token(haystack: &str, needle: &str, is_token_char: impl Fn(char) -> bool) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(&is_token_char) && !after.is_some_and(&is_token_char)
    })
}
