//! Core Error Types
//!
//! Defines the foundational error types used across the Avagama workspace.
//! These error types are dependency-free (only thiserror + std) to keep the core
//! crate lightweight.
//!
//! The application crate wraps these in `AppError` alongside variants that
//! require heavier dependencies (SQLite, HTTP).

use thiserror::Error;

/// Core error type for the Avagama workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parse errors for persisted tags and identifiers
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
