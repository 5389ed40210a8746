//! Error types and handling.

use thiserror::Error;

/// Record-level error type.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Structural or business-rule violation of input data.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal attendance or task state-machine transition.
    #[error("Attendance error: {0}")]
    Attendance(String),
}

/// Result type alias for RecordError
pub type Result<T> = std::result::Result<T, RecordError>;

impl RecordError {
    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an attendance error with message
    pub fn attendance(msg: impl Into<String>) -> Self {
        Self::Attendance(msg.into())
    }
}
