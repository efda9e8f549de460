//! Mock browser for testing the automation flow without a real browser.

use async_trait::async_trait;
use shared::ScrapeError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::MetadataLatch;
use crate::session::{BrowserLauncher, BrowserSession};

/// Points in the session where a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStep {
    Open,
    WaitForVisible,
    TypeText,
    PressEnter,
}

/// A network response the mock page reports to its observer.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub url: String,
    pub method: String,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn get(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { url: url.into(), method: "GET".to_string(), body: body.into() }
    }
}

#[derive(Debug, Default)]
struct Counters {
    launches: AtomicUsize,
    closes: AtomicUsize,
}

/// Launcher whose sessions replay scripted responses and failures.
#[derive(Clone, Default)]
pub struct MockLauncher {
    on_open: Vec<MockResponse>,
    on_submit: Vec<MockResponse>,
    fail_at: Option<(MockStep, ScrapeError)>,
    fail_launch: Option<ScrapeError>,
    counters: Arc<Counters>,
    typed: Arc<Mutex<Vec<String>>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response delivered while the converter page loads.
    pub fn respond_on_open(mut self, response: MockResponse) -> Self {
        self.on_open.push(response);
        self
    }

    /// Response delivered when Enter is pressed.
    pub fn respond_on_submit(mut self, response: MockResponse) -> Self {
        self.on_submit.push(response);
        self
    }

    pub fn fail_at(mut self, step: MockStep, err: ScrapeError) -> Self {
        self.fail_at = Some((step, err));
        self
    }

    pub fn fail_launch(mut self, err: ScrapeError) -> Self {
        self.fail_launch = Some(err);
        self
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    /// Every string typed into the page, across all sessions.
    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, latch: MetadataLatch) -> Result<Box<dyn BrowserSession>, ScrapeError> {
        if let Some(err) = &self.fail_launch {
            return Err(err.clone());
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            launcher: self.clone(),
            latch,
            closed: false,
        }))
    }
}

struct MockSession {
    launcher: MockLauncher,
    latch: MetadataLatch,
    closed: bool,
}

impl MockSession {
    fn check(&self, step: MockStep) -> Result<(), ScrapeError> {
        match &self.launcher.fail_at {
            Some((at, err)) if *at == step => Err(err.clone()),
            _ => Ok(()),
        }
    }

    fn deliver(&self, responses: &[MockResponse]) {
        for r in responses {
            self.latch.observe(&r.url, &r.method, &r.body);
        }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("mock browser session dropped without close");
        }
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn open(&mut self, _url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.check(MockStep::Open)?;
        self.deliver(&self.launcher.on_open);
        Ok(())
    }

    async fn wait_for_visible(&mut self, _selector: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        self.check(MockStep::WaitForVisible)
    }

    async fn type_text(&mut self, _selector: &str, text: &str) -> Result<(), ScrapeError> {
        self.check(MockStep::TypeText)?;
        self.launcher.typed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn press_enter(&mut self, _selector: &str) -> Result<(), ScrapeError> {
        self.check(MockStep::PressEnter)?;
        self.deliver(&self.launcher.on_submit);
        Ok(())
    }

    // Every call is counted, so tests can catch double closes.
    async fn close(&mut self) -> Result<(), ScrapeError> {
        self.launcher.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        Ok(())
    }
}
