//! Error types for the catalog client

use reqwest::StatusCode;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the catalog API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status
    #[error("Catalog returned status {0}")]
    Status(StatusCode),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base URL or path
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Object unknown to the catalog
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl Error {
    /// True when the failure comes from reaching the catalog, not from its payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Status(_) | Error::InvalidUrl(_) | Error::NotFound(_)
        )
    }
}
