//! Closed-form solution of the loop pair.
//!
//! Both rows of the system are decoupled first-order lags started from rest,
//! so each output is `c / a * (1 - exp(-a t))` for its own rate `a` and
//! forcing `c`. Used as the reference for the numerical evaluator and as a
//! drop-in [`Evaluator`] of its own.

use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::evaluator::{Evaluator, Sample, SimulationRequest, SimulationResult};
use crate::params::FeedbackParams;

/// `(1 - exp(-a t)) / a`, continuous through `a = 0` where it equals `t`.
fn lag_response(a: f64, t: f64) -> f64 {
    if a == 0.0 {
        t
    } else {
        -(-a * t).exp_m1() / a
    }
}

/// Open loop output `y1(t) = (u + d)(1 - exp(-t))`.
pub fn open_loop_at(params: &FeedbackParams, t: f64) -> f64 {
    (params.setpoint + params.perturbation) * lag_response(1.0, t)
}

/// Closed loop output `y2(t) = (u*G + d) / (1 + G*K) * (1 - exp(-(1 + G*K) t))`.
pub fn closed_loop_at(params: &FeedbackParams, t: f64) -> f64 {
    let a = 1.0 + params.loop_gain();
    let c = params.setpoint * params.gain + params.perturbation;
    c * lag_response(a, t)
}

/// Limits of both outputs as `t` grows without bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    pub open_loop: f64,
    /// `None` when `1 + G*K <= 0`: the closed loop then has no finite limit.
    pub closed_loop: Option<f64>,
}

impl SteadyState {
    /// Closed loop minus open loop steady state, when both exist.
    pub fn feedback_effect(&self) -> Option<f64> {
        self.closed_loop.map(|c| c - self.open_loop)
    }
}

/// Open loop settles at `u + d`; closed loop at `(u*G + d) / (1 + G*K)`.
pub fn steady_state(params: &FeedbackParams) -> SteadyState {
    let a = 1.0 + params.loop_gain();
    let closed_loop = (a > 0.0).then(|| (params.setpoint * params.gain + params.perturbation) / a);
    SteadyState {
        open_loop: params.setpoint + params.perturbation,
        closed_loop,
    }
}

/// Evaluates the closed form on the request grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEvaluator;

impl Evaluator for AnalyticEvaluator {
    fn evaluate(&self, request: &SimulationRequest) -> ControlResult<SimulationResult> {
        request.validate()?;

        let samples = (0..request.sample_count)
            .map(|i| {
                let t = request.time_at(i);
                Sample {
                    time: t,
                    y_open_loop: open_loop_at(&request.params, t),
                    y_closed_loop: closed_loop_at(&request.params, t),
                }
            })
            .collect();

        Ok(SimulationResult { samples })
    }

    fn name(&self) -> &'static str {
        "analytic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_outputs_start_at_zero() {
        let p = FeedbackParams::new(10.0, -3.0, 50.0, 2.0);
        assert_eq!(open_loop_at(&p, 0.0), 0.0);
        assert_eq!(closed_loop_at(&p, 0.0), 0.0);
    }

    #[test]
    fn reference_steady_state() {
        let ss = steady_state(&FeedbackParams::new(10.0, 0.0, 50.0, 1.0));
        assert_eq!(ss.open_loop, 10.0);
        let closed = ss.closed_loop.unwrap();
        assert!((closed - 500.0 / 51.0).abs() < 1e-12);
        assert!((closed - 9.80).abs() < 5e-3);
        assert!(ss.feedback_effect().unwrap() < 0.0);
    }

    #[test]
    fn unit_gain_without_feedback_is_open_loop() {
        let p = FeedbackParams::new(7.0, 2.0, 1.0, 0.0);
        for t in [0.0, 0.3, 1.0, 4.0] {
            assert!((open_loop_at(&p, t) - closed_loop_at(&p, t)).abs() < 1e-12);
        }
        assert_eq!(steady_state(&p).feedback_effect(), Some(0.0));
    }

    #[test]
    fn zero_gain_leaves_only_perturbation() {
        let ss = steady_state(&FeedbackParams::new(7.0, 2.0, 0.0, 0.0));
        assert_eq!(ss.closed_loop, Some(2.0));
        assert_eq!(ss.open_loop, 9.0);
    }

    #[test]
    fn marginal_loop_grows_linearly() {
        // 1 + G*K = 0
        let p = FeedbackParams::new(1.0, 0.5, 2.0, -0.5);
        assert_eq!(steady_state(&p).closed_loop, None);
        assert!((closed_loop_at(&p, 3.0) - 2.5 * 3.0).abs() < 1e-12);
    }

    #[test]
    fn stronger_feedback_rejects_perturbation() {
        let weak = FeedbackParams::new(10.0, 4.0, 10.0, 1.0);
        let strong = FeedbackParams::new(10.0, 4.0, 100.0, 1.0);
        let shift = |p: &FeedbackParams| {
            steady_state(p).closed_loop.unwrap()
                - steady_state(&p.with(crate::ParamKind::Perturbation, 0.0))
                    .closed_loop
                    .unwrap()
        };
        assert!(shift(&strong).abs() < shift(&weak).abs());
        assert!(shift(&strong).abs() < 4.0);
    }
}
