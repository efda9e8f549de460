pub mod api;
pub mod format;
pub mod pipeline;
pub mod validate;

pub use api::routes::create_api_router;
pub use pipeline::Pipeline;
