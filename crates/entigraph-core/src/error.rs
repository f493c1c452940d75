//! Error types for Entigraph Core

use thiserror::Error;

/// Result type alias using Entigraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Entigraph error types
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata catalog could not be reached (network or authentication)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A relationship record whose shape is neither one-to-many nor many-to-many
    #[error("Unrecognized relationship type '{odata_type}' for {schema_name}")]
    UnrecognizedRelationshipType {
        schema_name: String,
        odata_type: String,
    },

    #[error("Invalid filter_mode: {0}")]
    InvalidFilterMode(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than upstream
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidFilterMode(_))
    }
}
