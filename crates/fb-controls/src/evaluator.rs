//! The dynamics evaluator: request in, uniformly sampled trajectories out.

use fb_sim::{IntegratorType, SampledOptions, run_sampled};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::params::FeedbackParams;
use crate::plant::FeedbackLoop;

/// Horizon used by the reference dashboard.
pub const DEFAULT_HORIZON: f64 = 6.0;
/// Sample count used by the reference dashboard.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// One evaluation: a horizon, a grid size and the loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub horizon: f64,
    pub sample_count: usize,
    pub params: FeedbackParams,
}

impl SimulationRequest {
    pub fn new(horizon: f64, sample_count: usize, params: FeedbackParams) -> Self {
        Self {
            horizon,
            sample_count,
            params,
        }
    }

    pub fn with_params(mut self, params: FeedbackParams) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(ControlError::invalid(format!(
                "horizon must be positive and finite (got {})",
                self.horizon
            )));
        }
        if self.sample_count < 2 {
            return Err(ControlError::invalid(format!(
                "sample_count must be at least 2 (got {})",
                self.sample_count
            )));
        }
        self.params.validate()
    }

    /// Time of grid point `i`.
    pub fn time_at(&self, i: usize) -> f64 {
        fb_core::numeric::grid_point(0.0, self.horizon, i, self.sample_count)
    }
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self::new(
            DEFAULT_HORIZON,
            DEFAULT_SAMPLE_COUNT,
            FeedbackParams::default(),
        )
    }
}

/// Both outputs at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub y_open_loop: f64,
    pub y_closed_loop: f64,
}

/// Time-ordered samples covering `[0, horizon]`, endpoints included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub samples: Vec<Sample>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn open_loop(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y_open_loop).collect()
    }

    pub fn closed_loop(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y_closed_loop).collect()
    }
}

impl From<Vec<Sample>> for SimulationResult {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl<'a> IntoIterator for &'a SimulationResult {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Numerical settings for [`FeedbackEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorOptions {
    pub integrator: IntegratorType,
    /// Safety limit on internal integration steps.
    pub max_steps: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        let sampled = SampledOptions::default();
        Self {
            integrator: sampled.integrator,
            max_steps: sampled.max_steps,
        }
    }
}

/// Anything that turns a request into trajectories.
///
/// Front ends take an evaluator as a dependency so the computation can be
/// swapped or tested without a UI.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, request: &SimulationRequest) -> ControlResult<SimulationResult>;

    /// Short name for logs and run manifests.
    fn name(&self) -> &'static str;
}

/// Integrates the loop numerically.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackEvaluator {
    pub options: EvaluatorOptions,
}

impl FeedbackEvaluator {
    pub fn new(options: EvaluatorOptions) -> Self {
        Self { options }
    }
}

impl Evaluator for FeedbackEvaluator {
    fn evaluate(&self, request: &SimulationRequest) -> ControlResult<SimulationResult> {
        evaluate_with(request, &self.options)
    }

    fn name(&self) -> &'static str {
        self.options.integrator.label()
    }
}

/// Simulate both loops from rest over `[0, horizon]`.
///
/// Fails with [`ControlError::InvalidParameter`] when `horizon <= 0` or
/// `sample_count < 2`.
pub fn simulate(
    horizon: f64,
    sample_count: usize,
    u: f64,
    d: f64,
    g: f64,
    k: f64,
) -> ControlResult<SimulationResult> {
    let request = SimulationRequest::new(horizon, sample_count, FeedbackParams::new(u, d, g, k));
    evaluate(&request)
}

/// Evaluate a request with default numerical settings.
pub fn evaluate(request: &SimulationRequest) -> ControlResult<SimulationResult> {
    evaluate_with(request, &EvaluatorOptions::default())
}

pub fn evaluate_with(
    request: &SimulationRequest,
    options: &EvaluatorOptions,
) -> ControlResult<SimulationResult> {
    request.validate()?;
    tracing::debug!(
        horizon = request.horizon,
        samples = request.sample_count,
        loop_gain = request.params.loop_gain(),
        "evaluating feedback loop"
    );

    let mut plant = FeedbackLoop::new(&request.params);
    let opts = SampledOptions {
        max_steps: options.max_steps,
        ..SampledOptions::new(request.horizon, request.sample_count)
    }
    .with_integrator(options.integrator);

    let record = run_sampled(&mut plant, &opts)?;

    let samples = record
        .t
        .iter()
        .zip(&record.x)
        .map(|(t, x)| Sample {
            time: *t,
            y_open_loop: x[0],
            y_closed_loop: x[1],
        })
        .collect();

    Ok(SimulationResult { samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_reference_dashboard() {
        let req = SimulationRequest::default();
        assert_eq!(req.horizon, 6.0);
        assert_eq!(req.sample_count, 100);
        req.validate().unwrap();
    }

    #[test]
    fn time_at_hits_endpoints() {
        let req = SimulationRequest::default();
        assert_eq!(req.time_at(0), 0.0);
        assert_eq!(req.time_at(99), 6.0);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        for (horizon, n) in [(0.0, 100), (-5.0, 100), (6.0, 1), (6.0, 0), (f64::NAN, 100)] {
            let err = simulate(horizon, n, 1.0, 1.0, 50.0, 1.0).unwrap_err();
            assert!(
                matches!(err, ControlError::InvalidParameter { .. }),
                "horizon={horizon}, n={n}"
            );
        }
    }

    #[test]
    fn step_limit_maps_to_invalid_parameter() {
        let req = SimulationRequest::default();
        let opts = EvaluatorOptions {
            max_steps: 10,
            ..EvaluatorOptions::default()
        };
        let err = evaluate_with(&req, &opts).unwrap_err();
        assert!(err.to_string().contains("Step limit"));
    }

    #[test]
    fn evaluator_trait_object_works() {
        let evaluator: Box<dyn Evaluator> = Box::new(FeedbackEvaluator::default());
        let result = evaluator.evaluate(&SimulationRequest::default()).unwrap();
        assert_eq!(result.len(), 100);
        assert_eq!(evaluator.name(), "rk4");
    }

    #[test]
    fn accessors_preserve_pairing() {
        let result = simulate(6.0, 10, 10.0, 0.0, 50.0, 1.0).unwrap();
        let open = result.open_loop();
        let closed = result.closed_loop();
        for (i, s) in result.iter().enumerate() {
            assert_eq!(open[i], s.y_open_loop);
            assert_eq!(closed[i], s.y_closed_loop);
        }
    }
}
