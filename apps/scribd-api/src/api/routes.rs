use crate::{api::error::ApiError, pipeline::Pipeline, validate::validate_document_url};
use serde::Deserialize;
use serde_json::Value;
use shared::core::constants::CREATOR;
use std::sync::Arc;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ScribdQuery {
    pub url: Option<String>,
}

pub fn create_api_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(|| async { "OK" }))
        .route("/api/tools/scribd", get(scribd_handler))
        .with_state(pipeline)
}

async fn root_handler() -> Json<Value> {
    Json(serde_json::json!({
        "message": "Scribd Downloader API is Running",
        "usage": "/api/tools/scribd?url=HTTPS_SCRIBD_URL",
    }))
}

async fn scribd_handler(
    State(pipeline): State<Arc<Pipeline>>,
    query: Option<Query<ScribdQuery>>,
) -> Result<Json<Value>, ApiError> {
    // An unparseable query string counts as a missing parameter.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let url = validate_document_url(query.url.as_deref())?;

    match pipeline.run(url).await {
        Ok(result) => {
            info!("Extraction finished: {}", result.download_url);
            Ok(Json(serde_json::json!({
                "creator": CREATOR,
                "result": result,
            })))
        }
        Err(e) => {
            warn!("Extraction failed for {}: {}", url, e);
            Err(e.into())
        }
    }
}
