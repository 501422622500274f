//! Result data types.

use chrono::Utc;
use fb_controls::SimulationRequest;
use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Stored alongside the samples of every saved run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub timestamp: String,
    pub request: SimulationRequest,
    /// Name of the evaluator that produced the samples.
    pub evaluator: String,
    pub solver_version: String,
    pub sample_count: usize,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        request: SimulationRequest,
        evaluator: &str,
        solver_version: &str,
        sample_count: usize,
    ) -> Self {
        Self {
            run_id,
            timestamp: Utc::now().to_rfc3339(),
            request,
            evaluator: evaluator.to_string(),
            solver_version: solver_version.to_string(),
            sample_count,
        }
    }
}
