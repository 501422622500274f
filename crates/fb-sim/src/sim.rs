//! Simulation runner and result recording.

use std::fmt;
use std::str::FromStr;

use fb_core::numeric::grid_point;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, most accurate, 4 rhs calls per step).
    #[default]
    #[serde(rename = "rk4")]
    RK4,
    /// Forward Euler (1st-order, faster, 1 rhs call per step).
    ForwardEuler,
}

impl IntegratorType {
    pub fn label(self) -> &'static str {
        match self {
            IntegratorType::RK4 => "rk4",
            IntegratorType::ForwardEuler => "forward_euler",
        }
    }
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IntegratorType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rk4" => Ok(IntegratorType::RK4),
            "euler" | "forward_euler" => Ok(IntegratorType::ForwardEuler),
            _ => Err(SimError::InvalidArg {
                what: "unknown integrator (expected rk4 or forward_euler)",
            }),
        }
    }
}

/// Options for a run recorded on a uniform time grid.
#[derive(Clone, Debug)]
pub struct SampledOptions {
    /// Final simulation time; samples span `[0, horizon]`
    pub horizon: f64,
    /// Number of recorded samples, both endpoints included
    pub sample_count: usize,
    /// Upper bound on the internal step
    pub max_dt: f64,
    /// Upper bound on `max_rate * dt` for models that report a rate
    pub max_rate_dt: f64,
    /// Maximum number of internal steps (safety limit)
    pub max_steps: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl SampledOptions {
    pub fn new(horizon: f64, sample_count: usize) -> Self {
        Self {
            horizon,
            sample_count,
            ..Self::default()
        }
    }

    pub fn with_integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = integrator;
        self
    }

    fn validate(&self) -> SimResult<()> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "horizon must be positive and finite",
            });
        }
        if self.sample_count < 2 {
            return Err(SimError::InvalidArg {
                what: "sample_count must be at least 2",
            });
        }
        if self.max_dt.is_nan() || self.max_dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_dt must be positive",
            });
        }
        if self.max_rate_dt.is_nan() || self.max_rate_dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "max_rate_dt must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }

    /// Internal steps taken between two consecutive samples.
    fn substeps(&self, max_rate: Option<f64>) -> SimResult<usize> {
        let interval = self.horizon / (self.sample_count - 1) as f64;

        let mut dt_limit = self.max_dt;
        if let Some(rate) = max_rate.filter(|r| r.is_finite() && *r > 0.0) {
            dt_limit = dt_limit.min(self.max_rate_dt / rate);
        }

        let substeps = (interval / dt_limit).ceil().max(1.0);
        let required = substeps * (self.sample_count - 1) as f64;
        if required > self.max_steps as f64 {
            return Err(SimError::StepLimit {
                required: required.min(usize::MAX as f64) as usize,
                limit: self.max_steps,
            });
        }
        Ok(substeps as usize)
    }
}

impl Default for SampledOptions {
    fn default() -> Self {
        Self {
            horizon: 1.0,
            sample_count: 100,
            max_dt: 1e-2,
            max_rate_dt: 1e-2,
            max_steps: 50_000_000,
            integrator: IntegratorType::default(),
        }
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Run a transient simulation and record the state at `sample_count`
/// uniformly spaced times on `[0, horizon]`.
///
/// Sample times come from the grid index, never from accumulated steps, so
/// the first record is at exactly 0 and the last at exactly `horizon`.
pub fn run_sampled<M: TransientModel>(
    model: &mut M,
    opts: &SampledOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;

    let substeps = opts.substeps(model.max_rate())?;
    let n = opts.sample_count;

    let mut x = model.initial_state();
    if !model.is_finite(&x) {
        return Err(SimError::NonPhysical {
            what: "initial state is not finite",
        });
    }

    let mut t_record = Vec::with_capacity(n);
    let mut x_record = Vec::with_capacity(n);
    t_record.push(0.0);
    x_record.push(x.clone());

    for i in 1..n {
        let t_start = grid_point(0.0, opts.horizon, i - 1, n);
        let t_end = grid_point(0.0, opts.horizon, i, n);
        let dt = (t_end - t_start) / substeps as f64;

        for j in 0..substeps {
            let t = t_start + j as f64 * dt;
            x = match opts.integrator {
                IntegratorType::RK4 => RK4.step(model, t, &x, dt)?,
                IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &x, dt)?,
            };
        }

        if !model.is_finite(&x) {
            return Err(SimError::NonPhysical {
                what: "state diverged to a non-finite value",
            });
        }

        t_record.push(t_end);
        x_record.push(x.clone());
    }

    tracing::debug!(
        samples = n,
        substeps,
        steps = substeps * (n - 1),
        integrator = %opts.integrator,
        "sampled run complete"
    );

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
