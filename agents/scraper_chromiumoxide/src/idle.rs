//! Network quiet detection for page loads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct IdleState {
    in_flight: HashSet<String>,
    /// Last request activity that left the count at or below the threshold.
    quiet_since: Option<Instant>,
}

/// Tracks requests in flight on a page, keyed by request id.
///
/// The network counts as idle once at most `max_in_flight` requests are
/// pending and no request has started or finished for the quiet window.
#[derive(Debug, Clone)]
pub struct NetworkIdle {
    max_in_flight: usize,
    state: Arc<Mutex<IdleState>>,
}

impl NetworkIdle {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight,
            state: Arc::new(Mutex::new(IdleState {
                in_flight: HashSet::new(),
                quiet_since: Some(Instant::now()),
            })),
        }
    }

    pub fn request_started(&self, request_id: &str) {
        self.update(|in_flight| {
            in_flight.insert(request_id.to_string());
        });
    }

    pub fn request_finished(&self, request_id: &str) {
        self.update(|in_flight| {
            in_flight.remove(request_id);
        });
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().map(|s| s.in_flight.len()).unwrap_or(0)
    }

    /// Returns once the network has stayed quiet for `quiet`.
    ///
    /// Never returns while the page keeps more than `max_in_flight` requests
    /// open, so callers bound it with their own timeout.
    pub async fn wait_for_idle(&self, quiet: Duration) {
        loop {
            let remaining = match self.state.lock() {
                Ok(state) => state
                    .quiet_since
                    .map(|since| quiet.saturating_sub(since.elapsed())),
                Err(_) => return,
            };

            match remaining {
                Some(left) if left.is_zero() => return,
                Some(left) => sleep(left.min(IDLE_POLL_INTERVAL)).await,
                None => sleep(IDLE_POLL_INTERVAL).await,
            }
        }
    }

    fn update(&self, change: impl FnOnce(&mut HashSet<String>)) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        change(&mut state.in_flight);
        state.quiet_since = if state.in_flight.len() <= self.max_in_flight {
            Some(Instant::now())
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const QUIET: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn idle_after_quiet_window_with_few_requests() {
        let idle = NetworkIdle::new(2);
        idle.request_started("1");
        idle.request_started("2");

        let started = Instant::now();
        idle.wait_for_idle(QUIET).await;
        assert!(started.elapsed() >= Duration::from_millis(500) - IDLE_POLL_INTERVAL);
        assert_eq!(idle.in_flight(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_network_never_settles() {
        let idle = NetworkIdle::new(2);
        for id in ["a", "b", "c"] {
            idle.request_started(id);
        }

        assert!(timeout(Duration::from_secs(30), idle.wait_for_idle(QUIET)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_window_restarts_when_traffic_resumes() {
        let idle = NetworkIdle::new(2);
        for id in ["a", "b", "c"] {
            idle.request_started(id);
        }

        let waiter = idle.clone();
        let started = Instant::now();
        let wait = tokio::spawn(async move { waiter.wait_for_idle(QUIET).await });

        sleep(Duration::from_millis(1_000)).await;
        idle.request_finished("a");
        sleep(Duration::from_millis(300)).await;
        // A burst pushes the count back over the threshold before the window closes.
        idle.request_started("d");
        sleep(Duration::from_millis(300)).await;
        idle.request_finished("d");

        wait.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2_100));
    }

    #[tokio::test(start_paused = true)]
    async fn activity_below_threshold_extends_the_window() {
        let idle = NetworkIdle::new(2);
        let started = Instant::now();

        sleep(Duration::from_millis(400)).await;
        idle.request_started("xhr");
        idle.wait_for_idle(QUIET).await;
        assert!(started.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_ids_count_once() {
        let idle = NetworkIdle::new(0);
        idle.request_started("redirected");
        idle.request_started("redirected");
        assert_eq!(idle.in_flight(), 1);

        idle.request_finished("redirected");
        idle.request_finished("unknown");
        assert_eq!(idle.in_flight(), 0);
        idle.wait_for_idle(QUIET).await;
    }
}
