//! Transient simulation framework for small ODE models.
//!
//! Provides:
//! - `TransientModel` trait for pluggable dynamic systems
//! - Fixed-step RK4 and forward Euler integrators
//! - A sampled runner that records the state on a uniform time grid

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use sim::{IntegratorType, SampledOptions, SimRecord, run_sampled};
