use std::fmt::Display;

// Error handling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("Parameter 'url' wajib diisi!")]
    MissingParameter,

    #[error("URL tidak valid. Masukkan URL dokumen Scribd yang benar.")]
    InvalidUrl,

    #[error("Navigation timeout of {0} ms exceeded")]
    NavigationTimeout(u64),

    #[error("Gagal mendapatkan metadata dokumen.")]
    MetadataExtractionFailed,

    /// Any other failure from the browser or network layer, carrying its raw message.
    #[error("{0}")]
    Upstream(String),
}

impl ScrapeError {
    pub fn upstream(err: impl Display) -> Self {
        ScrapeError::Upstream(err.to_string())
    }

    /// Validation failures are reported before any automation runs.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScrapeError::MissingParameter | ScrapeError::InvalidUrl)
    }
}
