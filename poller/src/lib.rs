//! Completion poller for the converter's status-check endpoint.

mod client;
mod poll;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{HttpStatusClient, PollerConfig, StatusSource};
pub use poll::{poll_until_done, PollPolicy};
