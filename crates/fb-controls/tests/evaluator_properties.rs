//! Behaviour of the dynamics evaluator over the reference parameter domain.

use fb_controls::{
    AnalyticEvaluator, ControlError, Evaluator, EvaluatorOptions, FeedbackEvaluator,
    FeedbackParams, SimulationRequest, simulate, steady_state,
};
use fb_sim::IntegratorType;
use proptest::prelude::*;

#[test]
fn result_spans_horizon_uniformly() {
    let result = simulate(6.0, 100, 1.0, 1.0, 50.0, 1.0).unwrap();

    assert_eq!(result.len(), 100);
    assert_eq!(result.first().unwrap().time, 0.0);
    assert_eq!(result.last().unwrap().time, 6.0);

    let h = 6.0 / 99.0;
    for w in result.samples.windows(2) {
        assert!(w[1].time > w[0].time);
        assert!((w[1].time - w[0].time - h).abs() < 1e-12);
    }
}

#[test]
fn both_loops_start_at_rest() {
    let result = simulate(6.0, 100, 20.0, -4.0, 100.0, 10.0).unwrap();
    let first = result.first().unwrap();
    assert_eq!(first.y_open_loop, 0.0);
    assert_eq!(first.y_closed_loop, 0.0);
}

#[test]
fn unit_gain_without_feedback_matches_open_loop() {
    let (u, d) = (8.0, 1.5);
    let result = simulate(50.0, 200, u, d, 1.0, 0.0).unwrap();

    for s in &result {
        assert!((s.y_open_loop - s.y_closed_loop).abs() < 1e-9);
    }
    let last = result.last().unwrap();
    assert!((last.y_open_loop - (u + d)).abs() < 1e-9);
    assert!((last.y_closed_loop - (u + d)).abs() < 1e-9);
}

#[test]
fn zero_gain_and_feedback_settle_on_the_equations() {
    let (u, d) = (8.0, 1.5);
    let result = simulate(50.0, 200, u, d, 0.0, 0.0).unwrap();
    let last = result.last().unwrap();

    assert!((last.y_open_loop - (u + d)).abs() < 1e-9);
    // With G = 0 only the perturbation drives the closed loop.
    assert!((last.y_closed_loop - d).abs() < 1e-9);
}

#[test]
fn feedback_changes_the_steady_state() {
    let result = simulate(50.0, 100, 10.0, 0.0, 50.0, 1.0).unwrap();
    let last = result.last().unwrap();

    assert!((last.y_open_loop - 10.0).abs() < 1e-6);
    assert!((last.y_closed_loop - 500.0 / 51.0).abs() < 1e-6);
    assert!((last.y_closed_loop - 9.80).abs() < 5e-3);
    assert!((last.y_open_loop - last.y_closed_loop).abs() > 0.1);
}

#[test]
fn repeated_calls_are_identical() {
    let a = simulate(6.0, 100, 3.5, -2.0, 70.0, 2.5).unwrap();
    let b = simulate(6.0, 100, 3.5, -2.0, 70.0, 2.5).unwrap();
    assert_eq!(a, b);
}

#[test]
fn two_samples_are_the_endpoints() {
    let result = simulate(4.0, 2, 1.0, 1.0, 50.0, 1.0).unwrap();
    assert_eq!(result.times(), vec![0.0, 4.0]);
}

#[test]
fn invalid_horizon_and_sample_count() {
    for (horizon, n) in [(0.0, 100), (6.0, 1), (-5.0, 100)] {
        let err = simulate(horizon, n, 1.0, 1.0, 50.0, 1.0).unwrap_err();
        assert!(matches!(err, ControlError::InvalidParameter { .. }));
    }
}

#[test]
fn extreme_slider_corner_is_stable() {
    let result = simulate(6.0, 100, 20.0, 4.0, 100.0, 10.0).unwrap();
    let expected = steady_state(&FeedbackParams::new(20.0, 4.0, 100.0, 10.0))
        .closed_loop
        .unwrap();
    let last = result.last().unwrap();
    assert!(last.y_closed_loop.is_finite());
    assert!((last.y_closed_loop - expected).abs() < 1e-9);
}

#[test]
fn forward_euler_is_close_on_a_fine_grid() {
    let req = SimulationRequest::new(6.0, 100, FeedbackParams::new(10.0, 1.0, 10.0, 1.0));
    let euler = FeedbackEvaluator::new(EvaluatorOptions {
        integrator: IntegratorType::ForwardEuler,
        ..EvaluatorOptions::default()
    });
    let numeric = euler.evaluate(&req).unwrap();
    let exact = AnalyticEvaluator.evaluate(&req).unwrap();

    // First order: visibly worse than RK4 but still on the curve.
    for (n, e) in numeric.iter().zip(&exact) {
        assert!((n.y_open_loop - e.y_open_loop).abs() < 2e-2);
        assert!((n.y_closed_loop - e.y_closed_loop).abs() < 0.15);
    }
}

fn slider_params() -> impl Strategy<Value = FeedbackParams> {
    (0.0f64..=20.0, -4.0f64..=4.0, 0.0f64..=100.0, 0.0f64..=10.0)
        .prop_map(|(u, d, g, k)| FeedbackParams::new(u, d, g, k))
}

#[test]
fn large_gain_with_weak_feedback_matches_closed_form() {
    for (g, k) in [(100.0, 0.05), (100.0, 0.01), (100.0, 0.0), (60.0, 0.2)] {
        let req = SimulationRequest::new(6.0, 100, FeedbackParams::new(20.0, 4.0, g, k));
        let numeric = FeedbackEvaluator::default().evaluate(&req).unwrap();
        let exact = AnalyticEvaluator.evaluate(&req).unwrap();

        for (a, b) in numeric.iter().zip(&exact) {
            assert!(
                (a.y_closed_loop - b.y_closed_loop).abs() <= 1e-6,
                "G={g} K={k} t={} numeric={} exact={}",
                a.time,
                a.y_closed_loop,
                b.y_closed_loop
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn numeric_matches_closed_form(params in slider_params(), horizon in 0.5f64..12.0, n in 2usize..150) {
        let req = SimulationRequest::new(horizon, n, params);
        let numeric = FeedbackEvaluator::default().evaluate(&req).unwrap();
        let exact = AnalyticEvaluator.evaluate(&req).unwrap();

        prop_assert_eq!(numeric.len(), n);
        for (a, b) in numeric.iter().zip(&exact) {
            prop_assert_eq!(a.time, b.time);
            prop_assert!((a.y_open_loop - b.y_open_loop).abs() <= 1e-6);
            prop_assert!((a.y_closed_loop - b.y_closed_loop).abs() <= 1e-6,
                "t={} numeric={} exact={}", a.time, a.y_closed_loop, b.y_closed_loop);
        }
    }
}
