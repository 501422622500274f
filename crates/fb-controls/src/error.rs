//! Error types for the dynamics evaluator.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while evaluating the feedback loop.
///
/// The evaluator has a single failure kind: the request itself is unusable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Horizon, sample count or a parameter is outside its domain.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: String },
}

impl ControlError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        ControlError::InvalidParameter { what: what.into() }
    }
}

impl From<fb_sim::SimError> for ControlError {
    fn from(e: fb_sim::SimError) -> Self {
        ControlError::InvalidParameter {
            what: e.to_string(),
        }
    }
}
