//! chromiumoxide backend.
//!
//! Every request pauses at the response stage through the Fetch domain so
//! the metadata body can be read before the request is continued unmodified.

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, GetResponseBodyParams, RequestPattern,
    RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures_util::StreamExt;
use shared::core::config::BrowserSettings;
use shared::core::constants::{NETWORK_IDLE_MAX_IN_FLIGHT, NETWORK_IDLE_QUIET_MS};
use shared::ScrapeError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::capture::{is_metadata_response, MetadataLatch};
use crate::idle::NetworkIdle;
use crate::session::{BrowserLauncher, BrowserSession};

const VISIBILITY_CHECK: &str = "function() { \
    const style = window.getComputedStyle(this); \
    const rect = this.getBoundingClientRect(); \
    return style.visibility !== 'hidden' && style.display !== 'none' && rect.width > 0 && rect.height > 0; \
}";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);
const EXIT_WAIT: Duration = Duration::from_secs(5);

/// Launches one chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    /// Builds the launch config for a browser using `profile` as its user data dir.
    pub fn browser_config(&self, profile: &Path) -> Result<BrowserConfig, ScrapeError> {
        let (width, height) = self.settings.window_size;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile)
            .window_size(width, height)
            .args(self.settings.args.iter().cloned());

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(ScrapeError::Upstream)
    }
}

/// Fresh browser profile, removed from disk when dropped.
fn new_profile_dir() -> Result<TempDir, ScrapeError> {
    tempfile::Builder::new()
        .prefix("scribd-chrome-")
        .tempdir()
        .map_err(ScrapeError::upstream)
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, latch: MetadataLatch) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        let profile = new_profile_dir()?;
        let config = self.browser_config(profile.path())?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(ScrapeError::upstream)?;

        // drive the handler in background
        let handler = tokio::spawn(async move { while let Some(_) = handler.next().await {} });
        info!("Browser launched with profile {}", profile.path().display());

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler,
            observer: None,
            network: None,
            idle: NetworkIdle::new(NETWORK_IDLE_MAX_IN_FLIGHT),
            closed: false,
            profile,
        };

        if let Err(e) = session.attach(latch).await {
            if let Err(close_err) = session.close().await {
                warn!("Failed to close browser after setup error: {}", close_err);
            }
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
    observer: Option<JoinHandle<()>>,
    network: Option<JoinHandle<()>>,
    idle: NetworkIdle,
    closed: bool,
    // Declared last so the directory outlives the browser process.
    profile: TempDir,
}

impl ChromiumSession {
    /// Opens the single page and starts the response observer before any navigation.
    async fn attach(&mut self, latch: MetadataLatch) -> Result<(), ScrapeError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(ScrapeError::upstream)?;

        let mut started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(ScrapeError::upstream)?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(ScrapeError::upstream)?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(ScrapeError::upstream)?;

        let idle = self.idle.clone();
        self.network = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = started.next() => idle.request_started(event.request_id.inner()),
                    Some(event) = finished.next() => idle.request_finished(event.request_id.inner()),
                    Some(event) = failed.next() => idle.request_finished(event.request_id.inner()),
                    else => break,
                }
            }
        }));

        // Subscribe first: once Fetch is enabled every request waits for us.
        let mut paused = page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(ScrapeError::upstream)?;

        let enable = EnableParams::builder()
            .pattern(
                RequestPattern::builder()
                    .url_pattern("*")
                    .request_stage(RequestStage::Response)
                    .build(),
            )
            .build();
        page.execute(enable).await.map_err(ScrapeError::upstream)?;

        let observer_page = page.clone();
        self.observer = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                inspect_and_continue(&observer_page, &latch, &event).await;
            }
        }));
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, ScrapeError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Upstream("Browser page is not open".to_string()))
    }
}

async fn inspect_and_continue(page: &Page, latch: &MetadataLatch, event: &EventRequestPaused) {
    let request = &event.request;

    if should_read_body(
        event.response_status_code,
        latch.is_set(),
        &request.url,
        &request.method,
    ) {
        match page
            .execute(GetResponseBodyParams::new(event.request_id.clone()))
            .await
        {
            Ok(resp) => match decode_body(&resp.result.body, resp.result.base64_encoded) {
                Some(body) => {
                    latch.observe(&request.url, &request.method, &body);
                }
                None => debug!("Undecodable body from {}", request.url),
            },
            Err(e) => debug!("Could not read body of {}: {}", request.url, e),
        }
    }

    if let Err(e) = page
        .execute(ContinueRequestParams::new(event.request_id.clone()))
        .await
    {
        debug!("Failed to continue {}: {}", request.url, e);
    }
}

/// Only metadata responses are read, and only until the first one is captured.
/// Requests paused before a response exists carry no body.
fn should_read_body(status_code: Option<i64>, captured: bool, url: &str, method: &str) -> bool {
    status_code.is_some() && !captured && is_metadata_response(url, method)
}

fn decode_body(body: &str, base64_encoded: bool) -> Option<Vec<u8>> {
    if base64_encoded {
        base64::engine::general_purpose::STANDARD.decode(body).ok()
    } else {
        Some(body.as_bytes().to_vec())
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn open(&mut self, url: &str, limit: Duration) -> Result<(), ScrapeError> {
        let page = self.page()?;
        let idle = &self.idle;
        let navigation = async {
            page.goto(url).await?;
            idle.wait_for_idle(Duration::from_millis(NETWORK_IDLE_QUIET_MS)).await;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match timeout(limit, navigation).await {
            Ok(Ok(())) => {
                debug!("Loaded {} ({} requests still open)", url, self.idle.in_flight());
                Ok(())
            }
            Ok(Err(e)) => Err(ScrapeError::upstream(e)),
            Err(_) => Err(ScrapeError::NavigationTimeout(limit.as_millis() as u64)),
        }
    }

    async fn wait_for_visible(&mut self, selector: &str, limit: Duration) -> Result<(), ScrapeError> {
        let page = self.page()?;
        let deadline = Instant::now() + limit;

        loop {
            if let Ok(element) = page.find_element(selector).await {
                let visible = element
                    .call_js_fn(VISIBILITY_CHECK, false)
                    .await
                    .ok()
                    .and_then(|r| r.result.value)
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                if visible {
                    return Ok(());
                }
            }

            if Instant::now() >= deadline {
                return Err(ScrapeError::Upstream(format!(
                    "Waiting for selector `{}` failed: {} ms exceeded",
                    selector,
                    limit.as_millis()
                )));
            }
            sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), ScrapeError> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(ScrapeError::upstream)?;
        element.focus().await.map_err(ScrapeError::upstream)?;
        element.type_str(text).await.map_err(ScrapeError::upstream)?;
        Ok(())
    }

    async fn press_enter(&mut self, selector: &str) -> Result<(), ScrapeError> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(ScrapeError::upstream)?;
        element.press_key("Enter").await.map_err(ScrapeError::upstream)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(observer) = self.observer.take() {
            observer.abort();
        }
        if let Some(network) = self.network.take() {
            network.abort();
        }
        self.page = None;

        let result = match self.browser.close().await {
            Ok(_) => {
                match timeout(EXIT_WAIT, self.browser.wait()).await {
                    Ok(Ok(_)) => debug!("Browser process exited"),
                    Ok(Err(e)) => warn!("Waiting for browser exit failed: {}", e),
                    Err(_) => warn!("Browser did not exit within {:?}", EXIT_WAIT),
                }
                Ok(())
            }
            Err(e) => Err(ScrapeError::upstream(e)),
        };

        self.handler.abort();
        debug!("Discarding profile {}", self.profile.path().display());
        info!("Browser closed");
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if !self.closed {
            // Browser's own Drop kills the child process.
            warn!("Browser session dropped without close");
            if let Some(observer) = self.observer.take() {
                observer.abort();
            }
            if let Some(network) = self.network.take() {
                network.abort();
            }
            self.handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_builds_with_explicit_executable() {
        let settings = BrowserSettings {
            executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..BrowserSettings::default()
        };
        let launcher = ChromiumLauncher::new(settings);
        let profile = new_profile_dir().unwrap();
        assert!(launcher.browser_config(profile.path()).is_ok());
    }

    #[test]
    fn each_launch_gets_its_own_profile() {
        let launcher = ChromiumLauncher::new(BrowserSettings {
            executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..BrowserSettings::default()
        });
        let first = new_profile_dir().unwrap();
        let second = new_profile_dir().unwrap();

        assert_ne!(first.path(), second.path());
        assert!(launcher.browser_config(first.path()).is_ok());
        assert!(launcher.browser_config(second.path()).is_ok());

        let kept = first.path().to_path_buf();
        assert!(kept.is_dir());
        drop(first);
        assert!(!kept.exists());
        assert!(second.path().is_dir());
    }

    #[test]
    fn reads_only_uncaptured_metadata_responses() {
        let meta = "https://scribd-downloader.co/api/document/640012345";

        assert!(should_read_body(Some(200), false, meta, "GET"));
        assert!(should_read_body(Some(404), false, meta, "GET"));
        // Paused at the request stage: nothing to read yet.
        assert!(!should_read_body(None, false, meta, "GET"));
        assert!(!should_read_body(Some(200), true, meta, "GET"));
        assert!(!should_read_body(Some(200), false, meta, "POST"));
        assert!(!should_read_body(Some(200), false, "https://scribd-downloader.co/app.js", "GET"));
    }

    #[test]
    fn decodes_base64_bodies() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(br#"{"id":1}"#);
        assert_eq!(decode_body(&encoded, true).unwrap(), br#"{"id":1}"#.to_vec());
        assert_eq!(decode_body("plain", false).unwrap(), b"plain".to_vec());
        assert!(decode_body("%%%not base64", true).is_none());
    }
}
