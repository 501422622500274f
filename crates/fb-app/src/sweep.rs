//! Parameter sweeps: one request per value of a single parameter.

use fb_controls::{
    Evaluator, FeedbackEvaluator, ParamKind, SimulationRequest, SteadyState, steady_state,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub value: f64,
    pub final_open_loop: f64,
    pub final_closed_loop: f64,
    pub steady: SteadyState,
}

/// Sweep with the default numerical evaluator.
pub fn sweep(
    base: &SimulationRequest,
    kind: ParamKind,
    values: &[f64],
) -> AppResult<Vec<SweepPoint>> {
    sweep_with(base, kind, values, &FeedbackEvaluator::default())
}

/// Evaluate `base` once per value of `kind`, in parallel. Points come back in
/// the order of `values`.
pub fn sweep_with(
    base: &SimulationRequest,
    kind: ParamKind,
    values: &[f64],
    evaluator: &dyn Evaluator,
) -> AppResult<Vec<SweepPoint>> {
    tracing::info!(param = %kind, points = values.len(), "starting sweep");

    let points = values
        .par_iter()
        .map(|&value| -> AppResult<SweepPoint> {
            let params = base.params.with(kind, value);
            let result = evaluator.evaluate(&base.with_params(params))?;
            let last = result.last().ok_or_else(|| {
                AppError::InvalidInput("evaluator returned no samples".to_string())
            })?;
            Ok(SweepPoint {
                value,
                final_open_loop: last.y_open_loop,
                final_closed_loop: last.y_closed_loop,
                steady: steady_state(&params),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(points)
}

/// `n` evenly spaced sweep values on `[start, end]`.
pub fn sweep_values(start: f64, end: f64, n: usize) -> AppResult<Vec<f64>> {
    fb_core::linspace(start, end, n).map_err(|e| AppError::InvalidInput(e.to_string()))
}
