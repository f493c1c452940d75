//! Source error types

use thiserror::Error;

/// Result type alias for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors raised while fetching catalog metadata
#[derive(Error, Debug)]
pub enum SourceError {
    #[cfg(feature = "dataverse")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Catalog API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Source configuration error: {0}")]
    Config(String),
}

impl From<SourceError> for entigraph_core::Error {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MalformedRecord(msg) => Self::MalformedRecord(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}
