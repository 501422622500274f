//! Dashboard state independent of any widget code.

use fb_app::DashboardConfig;
use fb_core::{Tolerances, nearly_equal};
use fb_controls::{
    FeedbackParams, ParamKind, SimulationRequest, SimulationResult, SteadyState, steady_state,
};

use crate::run_worker::WorkerMessage;

pub struct DashboardState {
    pub config: DashboardConfig,
    params: FeedbackParams,
    /// Generation of the most recently issued request.
    generation: u64,
    /// Generation of the result currently shown.
    shown_generation: u64,
    result: Option<SimulationResult>,
    last_error: Option<String>,
    last_eval_s: f64,
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        let params = config.default_params();
        Self {
            config,
            params,
            generation: 0,
            shown_generation: 0,
            result: None,
            last_error: None,
            last_eval_s: 0.0,
        }
    }

    pub fn params(&self) -> &FeedbackParams {
        &self.params
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_eval_s(&self) -> f64 {
        self.last_eval_s
    }

    pub fn steady(&self) -> SteadyState {
        steady_state(&self.params)
    }

    /// Returns `true` when the value actually changed.
    pub fn set_param(&mut self, kind: ParamKind, value: f64) -> bool {
        if nearly_equal(self.params.get(kind), value, Tolerances::default()) {
            return false;
        }
        self.params.set(kind, value);
        true
    }

    /// Back to the slider defaults. Returns `true` when anything changed.
    pub fn reset(&mut self) -> bool {
        let defaults = self.config.default_params();
        let changed = defaults != self.params;
        self.params = defaults;
        changed
    }

    /// Issue a new generation for the current parameters.
    pub fn next_request(&mut self) -> (u64, SimulationRequest) {
        self.generation += 1;
        (self.generation, self.config.request(self.params))
    }

    pub fn is_pending(&self) -> bool {
        self.shown_generation < self.generation
    }

    /// Apply a worker message. Anything older than what is already shown is
    /// dropped. Returns `true` when the message was applied.
    pub fn accept(&mut self, msg: WorkerMessage) -> bool {
        if msg.generation() <= self.shown_generation {
            return false;
        }
        self.shown_generation = msg.generation();

        match msg {
            WorkerMessage::Complete {
                result, elapsed_s, ..
            } => {
                self.result = Some(result);
                self.last_error = None;
                self.last_eval_s = elapsed_s;
            }
            WorkerMessage::Error { message, .. } => {
                self.last_error = Some(message);
            }
        }
        true
    }
}
