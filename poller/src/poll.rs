use shared::core::config::Timings;
use shared::types::{PollOutcome, PollResult};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::StatusSource;

/// Attempt budget and waits for the completion poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    /// Wait after a well-formed answer that is not done yet
    pub pending_delay: Duration,
    /// Wait after a failed request
    pub failure_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::from(&Timings::default())
    }
}

impl From<&Timings> for PollPolicy {
    fn from(t: &Timings) -> Self {
        Self {
            max_attempts: t.poll_max_attempts,
            pending_delay: t.poll_pending_delay,
            failure_delay: t.poll_failure_delay,
        }
    }
}

/// Polls `status_url` until it reports done or the attempt budget runs out.
///
/// Never fails: exhaustion is reported as [`PollOutcome::TimedOut`]. No wait
/// follows the final attempt.
pub async fn poll_until_done(
    source: &dyn StatusSource,
    status_url: &str,
    policy: &PollPolicy,
) -> PollOutcome {
    for attempt in 1..=policy.max_attempts {
        let wait = match source.fetch_status(status_url).await {
            Ok(PollResult::Done(url)) => {
                info!("Converted file ready after {} attempt(s)", attempt);
                return PollOutcome::Ready(url);
            }
            Ok(PollResult::Pending) => {
                debug!("Attempt {}/{}: not ready", attempt, policy.max_attempts);
                policy.pending_delay
            }
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, policy.max_attempts, e);
                policy.failure_delay
            }
        };

        if attempt < policy.max_attempts {
            sleep(wait).await;
        }
    }

    warn!("Gave up after {} attempts", policy.max_attempts);
    PollOutcome::TimedOut { attempts: policy.max_attempts }
}
