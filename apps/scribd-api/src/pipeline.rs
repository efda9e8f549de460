use poller::{poll_until_done, PollPolicy, StatusSource};
use scraper_chromiumoxide::{capture_metadata, BrowserLauncher};
use shared::core::config::{ServiceConfig, Timings};
use shared::types::ResponsePayload;
use shared::ScrapeError;
use std::sync::Arc;
use tracing::info;

use crate::format::format_payload;

/// The per-request extraction flow: capture metadata in a fresh browser,
/// then poll the status URL once the browser is gone.
pub struct Pipeline {
    launcher: Arc<dyn BrowserLauncher>,
    status: Arc<dyn StatusSource>,
    converter_url: String,
    timings: Timings,
}

impl Pipeline {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        status: Arc<dyn StatusSource>,
        converter_url: impl Into<String>,
        timings: Timings,
    ) -> Self {
        Self {
            launcher,
            status,
            converter_url: converter_url.into(),
            timings,
        }
    }

    pub fn from_config(
        config: &ServiceConfig,
        launcher: Arc<dyn BrowserLauncher>,
        status: Arc<dyn StatusSource>,
    ) -> Self {
        Self::new(launcher, status, config.converter_url.clone(), config.timings.clone())
    }

    /// Errors only come from the automation stage; polling degrades to the
    /// timeout sentinel instead.
    pub async fn run(&self, document_url: &str) -> Result<ResponsePayload, ScrapeError> {
        info!("Extracting download link for {}", document_url);

        let meta = capture_metadata(
            self.launcher.as_ref(),
            &self.converter_url,
            document_url,
            &self.timings,
        )
        .await?;

        let status_url = meta
            .status_url()
            .ok_or(ScrapeError::MetadataExtractionFailed)?;
        let policy = PollPolicy::from(&self.timings);
        let outcome = poll_until_done(self.status.as_ref(), status_url, &policy).await;

        Ok(format_payload(&meta, &outcome))
    }
}
