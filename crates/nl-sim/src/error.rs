//! Error types for closed-loop runs.

use nl_control::ControlError;
use thiserror::Error;

/// Errors encountered while driving a closed loop.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Process model error: {message}")]
    Model { message: String },

    #[error("Control error: {message}")]
    Control { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ControlError> for SimError {
    fn from(e: ControlError) -> Self {
        SimError::Control {
            message: e.to_string(),
        }
    }
}
