//! Mock implementation for testing

use async_trait::async_trait;
use shared::types::PollResult;
use shared::ScrapeError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::StatusSource;

/// Replays scripted answers, then repeats a fallback answer forever.
pub struct MockStatusSource {
    script: Mutex<VecDeque<Result<PollResult, ScrapeError>>>,
    fallback: Result<PollResult, ScrapeError>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockStatusSource {
    pub fn always(answer: Result<PollResult, ScrapeError>) -> Self {
        Self::scripted(Vec::new(), answer)
    }

    pub fn scripted(
        script: Vec<Result<PollResult, ScrapeError>>,
        fallback: Result<PollResult, ScrapeError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every URL that was polled, in order
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for MockStatusSource {
    async fn fetch_status(&self, url: &str) -> Result<PollResult, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
