use shared::core::constants::SCRIBD_DOCUMENT_MARKER;
use shared::ScrapeError;

/// Checks the `url` query parameter and hands it back unchanged.
pub fn validate_document_url(url: Option<&str>) -> Result<&str, ScrapeError> {
    match url {
        None | Some("") => Err(ScrapeError::MissingParameter),
        Some(url) if !url.contains(SCRIBD_DOCUMENT_MARKER) => Err(ScrapeError::InvalidUrl),
        Some(url) => Ok(url),
    }
}
