//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Step limit exceeded: {required} steps required, limit is {limit}")]
    StepLimit { required: usize, limit: usize },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<fb_core::FbError> for SimError {
    fn from(e: fb_core::FbError) -> Self {
        match e {
            fb_core::FbError::NonFinite { what, .. } => SimError::NonPhysical { what },
            fb_core::FbError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
