//! Smoke tests for the fb-app service layer.

use std::path::PathBuf;

use fb_app::{
    AppError, DashboardConfig, RunOptions, RunRequest, ensure_run, ensure_run_with, evaluate_only,
    get_run_summary, list_runs, load_config, load_run, save_config,
};
use fb_controls::{AnalyticEvaluator, FeedbackEvaluator, FeedbackParams, SimulationRequest};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn config_round_trips_through_yaml() {
    let dir = scratch_dir("fb_app_config_roundtrip");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dashboard.yaml");

    let mut config = DashboardConfig::default();
    config.horizon = 12.0;
    config.sliders[0].range.default = 5.0;
    save_config(&path, &config).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.default_params().setpoint, 5.0);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = scratch_dir("fb_app_config_invalid");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.yaml");
    std::fs::write(&path, "horizon: -1.0\n").unwrap();

    assert!(matches!(load_config(&path), Err(AppError::Validation(_))));
    assert!(matches!(
        load_config(&dir.join("missing.yaml")),
        Err(AppError::ConfigFileRead { .. })
    ));
}

#[test]
fn second_run_is_served_from_cache() {
    let root = scratch_dir("fb_app_run_cache");
    let request = RunRequest {
        request: SimulationRequest::new(6.0, 100, FeedbackParams::new(10.0, 0.0, 50.0, 1.0)),
        options: RunOptions {
            store_root: Some(root.clone()),
            ..RunOptions::default()
        },
    };

    let first = ensure_run(&request).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.result.len(), 100);
    assert_eq!(first.manifest.evaluator, "rk4");

    let second = ensure_run(&request).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.result, first.result);

    let runs = list_runs(Some(&root)).unwrap();
    assert_eq!(runs.len(), 1);
    let (manifest, result) = load_run(Some(&root), &first.run_id).unwrap();
    assert_eq!(manifest.request, request.request);
    assert_eq!(get_run_summary(&result).unwrap().sample_count, 100);
}

#[test]
fn cache_can_be_bypassed_and_evaluators_are_kept_apart() {
    let root = scratch_dir("fb_app_run_nocache");
    let request = RunRequest {
        request: SimulationRequest::default(),
        options: RunOptions {
            use_cache: false,
            store_root: Some(root.clone()),
            ..RunOptions::default()
        },
    };

    ensure_run(&request).unwrap();
    assert!(!ensure_run(&request).unwrap().loaded_from_cache);

    let analytic = ensure_run_with(&request, &AnalyticEvaluator).unwrap();
    assert_eq!(analytic.manifest.evaluator, "analytic");
    assert_eq!(list_runs(Some(&root)).unwrap().len(), 2);
}

#[test]
fn invalid_request_never_touches_the_store() {
    let root = scratch_dir("fb_app_run_invalid");
    let request = RunRequest {
        request: SimulationRequest::new(0.0, 100, FeedbackParams::default()),
        options: RunOptions {
            store_root: Some(root.clone()),
            ..RunOptions::default()
        },
    };

    assert!(matches!(ensure_run(&request), Err(AppError::Control(_))));
    assert!(!root.exists());
}

#[test]
fn missing_run_is_reported() {
    let root = scratch_dir("fb_app_run_missing");
    let err = load_run(Some(&root), "does-not-exist").unwrap_err();
    assert!(matches!(err, AppError::RunNotFound(_)));
}

#[test]
fn evaluate_only_matches_the_evaluator() {
    let request = SimulationRequest::default();
    let result = evaluate_only(&request, &FeedbackEvaluator::default()).unwrap();
    assert_eq!(result.len(), request.sample_count);
    assert_eq!(result.last().unwrap().time, request.horizon);
}

#[test]
fn truncated_cached_run_is_evaluated_again() {
    let root = scratch_dir("fb_app_run_truncated");
    let request = RunRequest {
        request: SimulationRequest::new(6.0, 100, FeedbackParams::new(20.0, 4.0, 100.0, 0.05)),
        options: RunOptions {
            store_root: Some(root.clone()),
            ..RunOptions::default()
        },
    };

    let first = ensure_run(&request).unwrap();
    let path = root.join(&first.run_id).join("timeseries.jsonl");
    let content = std::fs::read_to_string(&path).unwrap();
    let head: Vec<&str> = content.lines().take(3).collect();
    std::fs::write(&path, head.join("\n")).unwrap();

    let second = ensure_run(&request).unwrap();
    assert!(!second.loaded_from_cache);
    assert_eq!(second.result.len(), 100);
    assert_eq!(second.result.last().unwrap().time, 6.0);
    assert_eq!(second.result, first.result);

    // The re-evaluation repaired the store.
    let third = ensure_run(&request).unwrap();
    assert!(third.loaded_from_cache);
    assert_eq!(third.result.len(), 100);
}
