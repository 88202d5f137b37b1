//! Error types for control-loop operations.

use nl_core::CoreError;
use thiserror::Error;

/// Result type for control-loop operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control-loop operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a constructor or control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Numeric validation failure (non-finite or out-of-range value).
    #[error("Invalid numeric input: {message}")]
    Numeric { message: String },

    /// A pipeline read a named signal the sampled state does not carry.
    #[error("Missing signal: {name}")]
    MissingSignal { name: String },

    /// Failure inside a user-supplied transform. Not caught or retried by
    /// the scheduler; a transform is assumed total over its input domain.
    #[error("Transform failed: {what}")]
    Transform { what: String },
}

impl From<CoreError> for ControlError {
    fn from(e: CoreError) -> Self {
        ControlError::Numeric {
            message: e.to_string(),
        }
    }
}
