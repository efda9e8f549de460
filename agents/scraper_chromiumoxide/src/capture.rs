use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde_json::Value;
use shared::core::constants::METADATA_PATH_MARKER;
use shared::types::CapturedMetadata;
use tokio::time::sleep;
use tracing::debug;

/// Whether a response could come from the converter's metadata endpoint.
pub fn is_metadata_response(url: &str, method: &str) -> bool {
    url.contains(METADATA_PATH_MARKER) && method.eq_ignore_ascii_case("GET")
}

/// Single-assignment slot for the first metadata response of one page session.
///
/// Clones share the slot, so the observer and the driver can each hold one.
/// Once set, later observations are ignored.
#[derive(Debug, Clone, Default)]
pub struct MetadataLatch {
    slot: Arc<OnceLock<CapturedMetadata>>,
}

impl MetadataLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one observed response. Returns true only when this response was stored.
    pub fn observe(&self, url: &str, method: &str, body: &[u8]) -> bool {
        if !is_metadata_response(url, method) || self.is_set() {
            return false;
        }

        let json: Value = match serde_json::from_slice(body) {
            Ok(json) => json,
            Err(_) => return false,
        };

        match CapturedMetadata::from_json(&json) {
            Some(meta) => {
                let stored = self.offer(meta);
                if stored {
                    debug!("Captured document metadata from {}", url);
                }
                stored
            }
            None => false,
        }
    }

    pub fn offer(&self, meta: CapturedMetadata) -> bool {
        self.slot.set(meta).is_ok()
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<CapturedMetadata> {
        self.slot.get().cloned()
    }

    /// Checks the slot up to `iterations` times, sleeping `interval` between
    /// checks, with one last look after the final sleep.
    pub async fn wait(&self, iterations: u32, interval: Duration) -> Option<CapturedMetadata> {
        for _ in 0..iterations {
            if let Some(meta) = self.get() {
                return Some(meta);
            }
            sleep(interval).await;
        }
        self.get()
    }
}
