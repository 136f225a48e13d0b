//! Centralized error types for cucina.

use thiserror::Error;

/// Main error type for cucina operations.
#[derive(Error, Debug)]
pub enum CucinaError {
    #[error("Snapshot producer error: {0}")]
    Producer(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cucina operations.
pub type CucinaResult<T> = Result<T, CucinaError>;

impl CucinaError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a producer error.
    pub fn producer(msg: impl Into<String>) -> Self {
        Self::Producer(msg.into())
    }
}
