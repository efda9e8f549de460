use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ScrapeError;

/// Maps a [`ScrapeError`] onto the `{ status: false, message }` error body.
#[derive(Debug)]
pub struct ApiError(pub ScrapeError);

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": false,
            "message": self.0.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_400_everything_else_500() {
        assert_eq!(ApiError(ScrapeError::MissingParameter).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(ScrapeError::InvalidUrl).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(ScrapeError::NavigationTimeout(30000)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(ScrapeError::MetadataExtractionFailed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
