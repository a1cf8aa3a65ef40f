//! Core type definitions shared by catalog, matchers and correlator.

mod address;
mod confidence;
mod finding;
mod sweep_id;
mod usb_id;

pub use address::{normalize_mac, ArpEntry};
pub use confidence::Confidence;
pub use finding::{Finding, FindingKey, SignalType};
pub use sweep_id::SweepId;
pub use usb_id::UsbId;
