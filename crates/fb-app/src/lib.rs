//! Shared application service layer for the feedback demonstrator.
//!
//! Both front ends go through this crate: it owns the dashboard
//! configuration, runs and caches evaluations, answers queries on stored
//! runs and fans parameter sweeps out over a thread pool.

pub mod config;
pub mod error;
pub mod query;
pub mod run_service;
pub mod sweep;

pub use config::{
    ChartDef, DashboardConfig, SliderDef, load_config, save_config, validate_config,
};
pub use error::{AppError, AppResult};
pub use query::{RunSummary, extract_series, get_run_summary};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run, ensure_run_with,
    evaluate_only, list_runs, load_run, open_store,
};
pub use sweep::{SweepPoint, sweep, sweep_values, sweep_with};
