pub mod types;
pub mod core;
mod error;

pub use error::ScrapeError;
