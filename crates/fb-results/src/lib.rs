//! fb-results: run cache, timeseries storage and interchange formats.

pub mod frame;
pub mod hash;
pub mod store;
pub mod types;

pub use frame::{CLOSED_LOOP_COLUMN, OPEN_LOOP_COLUMN, SplitFrame, TIME_COLUMN, to_csv};
pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Malformed frame: {what}")]
    Frame { what: String },

    #[error("Incomplete run {run_id}: {what}")]
    Incomplete { run_id: String, what: String },
}
