use shared::core::config::Timings;
use shared::core::constants::INPUT_SELECTOR;
use shared::types::CapturedMetadata;
use shared::ScrapeError;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::capture::MetadataLatch;
use crate::session::{BrowserLauncher, BrowserSession};

/// Submits `document_url` to the converter page and returns the first
/// metadata response carrying a status-check URL.
///
/// The browser is closed exactly once after launch, whatever the outcome.
pub async fn capture_metadata(
    launcher: &dyn BrowserLauncher,
    converter_url: &str,
    document_url: &str,
    timings: &Timings,
) -> Result<CapturedMetadata, ScrapeError> {
    let latch = MetadataLatch::new();
    let mut session = launcher.launch(latch.clone()).await?;

    let driven = drive(session.as_mut(), &latch, converter_url, document_url, timings).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }

    match driven? {
        Some(meta) if meta.status_url().is_some() => {
            info!("Metadata captured for document id {}", meta.id);
            Ok(meta)
        }
        Some(_) => {
            warn!("Captured metadata has no status URL");
            Err(ScrapeError::MetadataExtractionFailed)
        }
        None => {
            warn!(
                "No metadata captured after {} checks",
                timings.capture_iterations
            );
            Err(ScrapeError::MetadataExtractionFailed)
        }
    }
}

async fn drive(
    session: &mut dyn BrowserSession,
    latch: &MetadataLatch,
    converter_url: &str,
    document_url: &str,
    timings: &Timings,
) -> Result<Option<CapturedMetadata>, ScrapeError> {
    session.open(converter_url, timings.navigation_timeout).await?;
    session
        .wait_for_visible(INPUT_SELECTOR, timings.selector_timeout)
        .await?;

    session.type_text(INPUT_SELECTOR, document_url).await?;
    sleep(timings.submit_settle).await;
    session.press_enter(INPUT_SELECTOR).await?;

    Ok(latch
        .wait(timings.capture_iterations, timings.capture_interval)
        .await)
}
