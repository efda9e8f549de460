//! Browser automation against the converter site.
//!
//! A [`BrowserLauncher`] starts one isolated browser per request with a
//! response observer already feeding a [`MetadataLatch`]; [`capture_metadata`]
//! drives the page and always closes the browser before returning.

pub mod capture;
pub mod chromium;
pub mod driver;
pub mod idle;
pub mod session;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use capture::{is_metadata_response, MetadataLatch};
pub use chromium::ChromiumLauncher;
pub use driver::capture_metadata;
pub use idle::NetworkIdle;
pub use session::{BrowserLauncher, BrowserSession};
