//! Fare data error types.

use std::path::PathBuf;

/// Errors that can occur when loading or fetching a fare table.
#[derive(Debug, thiserror::Error)]
pub enum FareError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fare source returned an error status
    #[error("fare source error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse snapshot JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Failed to read a snapshot file
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// Snapshot parsed but violates a table invariant
    #[error("invalid fare table: {0}")]
    Invalid(String),
}
