//! The open/closed loop pair as an explicit linear system.

use fb_sim::{SimResult, TransientModel};
use nalgebra::{Matrix2, Vector2};

use crate::params::FeedbackParams;

/// Both loops stacked into one state `x = [y_open, y_closed]`:
///
/// ```text
/// x' = A x + b
/// A  = | -1        0      |     b = | u + d     |
///      |  0   -(1 + G*K)  |         | u*G + d   |
/// ```
///
/// The closed loop row comes from expanding `-y2 + (u - y2*K)*G + d`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLoop {
    a: Matrix2<f64>,
    b: Vector2<f64>,
}

impl FeedbackLoop {
    pub fn new(params: &FeedbackParams) -> Self {
        let FeedbackParams {
            setpoint: u,
            perturbation: d,
            gain: g,
            feedback: k,
        } = *params;

        Self {
            a: Matrix2::new(-1.0, 0.0, 0.0, -(1.0 + g * k)),
            b: Vector2::new(u + d, u * g + d),
        }
    }

    pub fn system_matrix(&self) -> &Matrix2<f64> {
        &self.a
    }

    pub fn forcing(&self) -> &Vector2<f64> {
        &self.b
    }
}

impl TransientModel for FeedbackLoop {
    type State = Vector2<f64>;

    fn initial_state(&self) -> Self::State {
        Vector2::zeros()
    }

    fn rhs(&mut self, _t: f64, x: &Self::State) -> SimResult<Self::State> {
        Ok(self.a * x + self.b)
    }

    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State {
        a + b
    }

    fn scale(&self, a: &Self::State, scale: f64) -> Self::State {
        a * scale
    }

    /// Infinity norm of `A`, an upper bound on its spectral radius.
    fn max_rate(&self) -> Option<f64> {
        Some(self.a.abs().column_sum().amax())
    }

    fn is_finite(&self, x: &Self::State) -> bool {
        x.iter().all(|v| v.is_finite())
    }
}
