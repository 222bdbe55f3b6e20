//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
///
/// A demo whose promise rejects is not an error here; it is reported. These
/// are failures of the CLI itself.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Report serialization failed
    #[error("failed to render report: {0}")]
    Json(#[from] serde_json::Error),

    /// The log subscriber could not be installed
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for CLI operations
pub type DemoResult<T> = Result<T, DemoError>;
