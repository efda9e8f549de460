use async_trait::async_trait;
use shared::ScrapeError;
use std::time::Duration;

use crate::capture::MetadataLatch;

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync + 'static {
    /// Launches a fresh browser with a single page whose response observer is
    /// already registered and feeding `latch`. If launching fails part way,
    /// the implementation releases whatever it started before returning.
    async fn launch(&self, latch: MetadataLatch) -> Result<Box<dyn BrowserSession>, ScrapeError>;
}

/// The page-level operations the driver needs.
#[async_trait]
pub trait BrowserSession: Send {
    async fn open(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Waits until an element matching `selector` is present and visible.
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<(), ScrapeError>;

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), ScrapeError>;

    async fn press_enter(&mut self, selector: &str) -> Result<(), ScrapeError>;

    /// Terminates the browser process. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), ScrapeError>;
}
