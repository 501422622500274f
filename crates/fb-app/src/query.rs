//! Query helpers for extracting data from loaded runs.

use fb_controls::SimulationResult;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub sample_count: usize,
    pub final_open_loop: f64,
    pub final_closed_loop: f64,
    /// Largest value reached by each output.
    pub peak_open_loop: f64,
    pub peak_closed_loop: f64,
}

/// Get run summary from the samples of a run.
pub fn get_run_summary(samples: &SimulationResult) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Err(AppError::InvalidInput("No samples in run".to_string()));
    };

    let peak = |f: fn(&fb_controls::Sample) -> f64| {
        samples.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
    };

    Ok(RunSummary {
        time_range: (first.time, last.time),
        sample_count: samples.len(),
        final_open_loop: last.y_open_loop,
        final_closed_loop: last.y_closed_loop,
        peak_open_loop: peak(|s| s.y_open_loop),
        peak_closed_loop: peak(|s| s.y_closed_loop),
    })
}

/// Extract `(time, value)` pairs for one output.
pub fn extract_series(samples: &SimulationResult, variable: &str) -> AppResult<Vec<(f64, f64)>> {
    let pick: fn(&fb_controls::Sample) -> f64 = match variable {
        "open_loop" | "y_open_loop" | "open" => |s| s.y_open_loop,
        "closed_loop" | "y_closed_loop" | "closed" => |s| s.y_closed_loop,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown output variable: {}",
                variable
            )));
        }
    };

    Ok(samples.iter().map(|s| (s.time, pick(s))).collect())
}
