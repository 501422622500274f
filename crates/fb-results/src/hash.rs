//! Content-based hashing for run IDs.

use fb_controls::SimulationRequest;
use sha2::{Digest, Sha256};

pub fn compute_run_id(
    request: &SimulationRequest,
    evaluator: &str,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let request_json = serde_json::to_string(request).unwrap_or_default();
    hasher.update(request_json.as_bytes());

    hasher.update(evaluator.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_controls::{FeedbackParams, ParamKind};

    #[test]
    fn hash_stability() {
        let request = SimulationRequest::default();

        let hash1 = compute_run_id(&request, "rk4", "v1");
        let hash2 = compute_run_id(&request, "rk4", "v1");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = SimulationRequest::default();
        let other = base.with_params(FeedbackParams::default().with(ParamKind::Gain, 60.0));

        assert_ne!(
            compute_run_id(&base, "rk4", "v1"),
            compute_run_id(&other, "rk4", "v1")
        );
        assert_ne!(
            compute_run_id(&base, "rk4", "v1"),
            compute_run_id(&base, "analytic", "v1")
        );
        assert_ne!(
            compute_run_id(&base, "rk4", "v1"),
            compute_run_id(&base, "rk4", "v2")
        );
    }
}
