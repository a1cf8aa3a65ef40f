//! USB descriptor sources.
//!
//! Linux uses `lsusb -v -d vid:pid` per id. macOS has no per-id query, so the
//! full `ioreg -p IOUSB -l` tree is read once and shared by every query.

use super::process::run_command;
use super::DescriptorSource;
use crate::error::{CollectError, CollectResult};
use crate::matcher::UsbIdForm;
use crate::types::UsbId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// `lsusb`-backed source (Linux).
#[derive(Debug, Clone)]
pub struct Lsusb {
    timeout: Duration,
}

impl Lsusb {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DescriptorSource for Lsusb {
    fn platform(&self) -> &'static str {
        "linux"
    }

    fn id_form(&self) -> UsbIdForm {
        UsbIdForm::HexPair
    }

    async fn query(&self, id: UsbId) -> CollectResult<String> {
        let device = id.to_string();
        run_command("lsusb", &["-v", "-d", &device], self.timeout).await
    }
}

/// `ioreg`-backed source (macOS).
#[derive(Debug)]
pub struct Ioreg {
    timeout: Duration,
    tree: OnceCell<Option<String>>,
}

impl Ioreg {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            tree: OnceCell::new(),
        }
    }
}

#[async_trait]
impl DescriptorSource for Ioreg {
    fn platform(&self) -> &'static str {
        "macos"
    }

    fn id_form(&self) -> UsbIdForm {
        UsbIdForm::DecimalFields
    }

    async fn query(&self, id: UsbId) -> CollectResult<String> {
        let tree = self
            .tree
            .get_or_init(|| async {
                match run_command("ioreg", &["-p", "IOUSB", "-l", "-w", "0"], self.timeout).await {
                    Ok(tree) => Some(tree),
                    Err(e) => {
                        warn!(error = %e, "Failed to read the USB device tree");
                        None
                    }
                }
            })
            .await;

        debug!(%id, "Querying cached USB device tree");
        tree.clone().ok_or_else(|| CollectError::NoData("ioreg".to_string()))
    }
}

/// Descriptor source for the running platform, if one is supported.
pub fn platform_descriptor_source(timeout: Duration) -> Option<Arc<dyn DescriptorSource>> {
    match std::env::consts::OS {
        "linux" => Some(Arc::new(Lsusb::new(timeout))),
        "macos" => Some(Arc::new(Ioreg::new(timeout))),
        other => {
            warn!(platform = other, "USB descriptor probing is not supported on this platform");
            None
        }
    }
}
