//! Run execution and caching service.

use std::path::{Path, PathBuf};

use fb_controls::{
    Evaluator, EvaluatorOptions, FeedbackEvaluator, SimulationRequest, SimulationResult,
};
use fb_core::Timer;
use fb_results::{RunManifest, RunStore, compute_run_id};
use fb_sim::IntegratorType;

use crate::error::{AppError, AppResult};

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    /// Run store directory; `None` uses [`RunStore::default_location`].
    pub store_root: Option<PathBuf>,
    pub solver_version: String,
    pub integrator: IntegratorType,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            store_root: None,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            integrator: IntegratorType::default(),
        }
    }
}

/// Request to execute a run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub request: SimulationRequest,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub evaluate_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub result: SimulationResult,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

pub fn open_store(root: Option<&Path>) -> AppResult<RunStore> {
    let store = match root {
        Some(root) => RunStore::new(root.to_path_buf())?,
        None => RunStore::default_location()?,
    };
    Ok(store)
}

/// Evaluate in memory without touching a run store.
pub fn evaluate_only(
    request: &SimulationRequest,
    evaluator: &dyn Evaluator,
) -> AppResult<SimulationResult> {
    Ok(evaluator.evaluate(request)?)
}

/// Execute or load a run with the numerical evaluator selected by the options.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let evaluator = FeedbackEvaluator::new(EvaluatorOptions {
        integrator: request.options.integrator,
        ..EvaluatorOptions::default()
    });
    ensure_run_with(request, &evaluator)
}

/// Execute or load a run with an explicit evaluator.
pub fn ensure_run_with(request: &RunRequest, evaluator: &dyn Evaluator) -> AppResult<RunResponse> {
    let total = Timer::start("ensure_run");
    let mut timing = RunTimingSummary::default();

    request.request.validate()?;

    let run_id = compute_run_id(
        &request.request,
        evaluator.name(),
        &request.options.solver_version,
    );
    let store = open_store(request.options.store_root.as_deref())?;

    if request.options.use_cache && store.has_run(&run_id) {
        let load = Timer::start("load_cached_run");
        match load_cached(&store, &run_id, &request.request) {
            Ok((manifest, result)) => {
                timing.load_cache_time_s = load.stop();
                timing.total_time_s = total.stop();
                tracing::info!(%run_id, "loaded cached run");
                return Ok(RunResponse {
                    run_id,
                    manifest,
                    result,
                    loaded_from_cache: true,
                    timing,
                });
            }
            Err(e) => {
                tracing::warn!(%run_id, error = %e, "cached run unreadable, re-evaluating");
            }
        }
    }

    let eval = Timer::start("evaluate");
    let result = evaluator.evaluate(&request.request)?;
    timing.evaluate_time_s = eval.stop();

    let manifest = RunManifest::new(
        run_id.clone(),
        request.request,
        evaluator.name(),
        &request.options.solver_version,
        result.len(),
    );

    let save = Timer::start("save_run");
    store.save_run(&manifest, &result)?;
    timing.save_time_s = save.stop();
    timing.total_time_s = total.stop();

    tracing::info!(
        %run_id,
        evaluator = evaluator.name(),
        samples = result.len(),
        store = %store.root_dir().display(),
        "run completed"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        result,
        loaded_from_cache: false,
        timing,
    })
}

/// A cache hit only counts when the stored run is complete and was made for
/// the same request.
fn load_cached(
    store: &RunStore,
    run_id: &str,
    request: &SimulationRequest,
) -> AppResult<(RunManifest, SimulationResult)> {
    let (manifest, result) = store.load_run(run_id)?;
    if manifest.request != *request {
        return Err(AppError::Results(format!(
            "run {run_id} was stored for a different request"
        )));
    }
    Ok((manifest, result))
}

/// Stored runs, most recent first.
pub fn list_runs(store_root: Option<&Path>) -> AppResult<Vec<RunManifest>> {
    let store = open_store(store_root)?;

    let mut runs = store.list_runs()?;
    runs.reverse();
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(
    store_root: Option<&Path>,
    run_id: &str,
) -> AppResult<(RunManifest, SimulationResult)> {
    let store = open_store(store_root)?;
    Ok(store.load_run(run_id)?)
}
