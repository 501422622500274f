//! Open-loop versus closed-loop dynamics for the feedback demonstrator.
//!
//! Two first-order systems share the same constant forcing: a setpoint `u`
//! and a perturbation `d`. Both start at rest.
//!
//! ```text
//! dy1/dt = -y1 + u + d                 (open loop)
//! dy2/dt = -y2 + (u - y2*K) * G + d    (closed loop)
//! ```
//!
//! The open loop output drifts with every perturbation. The closed loop wraps
//! the same plant in proportional feedback: as `G*K` grows its steady state
//! becomes less sensitive to `d`.
//!
//! # Architecture
//!
//! - [`FeedbackParams`] and [`ParamRange`] describe the four inputs and their
//!   reference slider ranges
//! - [`FeedbackLoop`] is the plant as an explicit linear system `x' = A x + b`
//! - [`FeedbackEvaluator`] integrates the plant numerically onto a uniform grid
//! - [`AnalyticEvaluator`] evaluates the closed-form solution on the same grid
//!
//! Both evaluators are pure: identical requests give identical results.

pub mod analytic;
pub mod error;
pub mod evaluator;
pub mod params;
pub mod plant;

pub use analytic::{AnalyticEvaluator, SteadyState, closed_loop_at, open_loop_at, steady_state};
pub use error::{ControlError, ControlResult};
pub use evaluator::{
    DEFAULT_HORIZON, DEFAULT_SAMPLE_COUNT, Evaluator, EvaluatorOptions, FeedbackEvaluator, Sample,
    SimulationRequest, SimulationResult, evaluate, evaluate_with, simulate,
};
pub use params::{FeedbackParams, ParamKind, ParamRange};
pub use plant::FeedbackLoop;
