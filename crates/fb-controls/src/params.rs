//! Loop parameters and their reference ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// The four scalar inputs of the feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackParams {
    /// Setpoint `u`: desired target, constant forcing on both loops.
    pub setpoint: f64,
    /// Perturbation `d`: external disturbance, constant forcing on both loops.
    pub perturbation: f64,
    /// Gain `G`: multiplier on the feedback-corrected driving signal.
    pub gain: f64,
    /// Feedback factor `K`: how strongly the output is fed back.
    pub feedback: f64,
}

impl FeedbackParams {
    pub fn new(setpoint: f64, perturbation: f64, gain: f64, feedback: f64) -> Self {
        Self {
            setpoint,
            perturbation,
            gain,
            feedback,
        }
    }

    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::Setpoint => self.setpoint,
            ParamKind::Perturbation => self.perturbation,
            ParamKind::Gain => self.gain,
            ParamKind::Feedback => self.feedback,
        }
    }

    pub fn set(&mut self, kind: ParamKind, value: f64) {
        match kind {
            ParamKind::Setpoint => self.setpoint = value,
            ParamKind::Perturbation => self.perturbation = value,
            ParamKind::Gain => self.gain = value,
            ParamKind::Feedback => self.feedback = value,
        }
    }

    /// Copy with one parameter replaced.
    pub fn with(mut self, kind: ParamKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    /// `G*K`, the open-loop gain of the feedback path.
    pub fn loop_gain(&self) -> f64 {
        self.gain * self.feedback
    }

    /// Reject NaN and infinite values. Any finite value is a valid input.
    pub fn validate(&self) -> ControlResult<()> {
        for kind in ParamKind::ALL {
            let v = self.get(kind);
            if !v.is_finite() {
                return Err(ControlError::invalid(format!(
                    "{} must be finite (got {v})",
                    kind.name()
                )));
            }
        }
        Ok(())
    }
}

impl Default for FeedbackParams {
    /// Defaults of the reference sliders: u=1, d=1, G=50, K=1.
    fn default() -> Self {
        Self::new(
            ParamKind::Setpoint.reference_range().default,
            ParamKind::Perturbation.reference_range().default,
            ParamKind::Gain.reference_range().default,
            ParamKind::Feedback.reference_range().default,
        )
    }
}

/// Addresses one of the four parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Setpoint,
    Perturbation,
    Gain,
    Feedback,
}

impl ParamKind {
    pub const ALL: [ParamKind; 4] = [
        ParamKind::Setpoint,
        ParamKind::Perturbation,
        ParamKind::Gain,
        ParamKind::Feedback,
    ];

    /// Symbol used in the equations.
    pub fn symbol(self) -> &'static str {
        match self {
            ParamKind::Setpoint => "u",
            ParamKind::Perturbation => "d",
            ParamKind::Gain => "G",
            ParamKind::Feedback => "K",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Setpoint => "setpoint",
            ParamKind::Perturbation => "perturbation",
            ParamKind::Gain => "gain",
            ParamKind::Feedback => "feedback",
        }
    }

    /// Label shown next to the slider.
    pub fn label(self) -> &'static str {
        match self {
            ParamKind::Setpoint => "u - setpoint",
            ParamKind::Perturbation => "d - perturbation",
            ParamKind::Gain => "G - gain",
            ParamKind::Feedback => "K - amplification factor",
        }
    }

    pub fn reference_range(self) -> ParamRange {
        match self {
            ParamKind::Setpoint => ParamRange::new(0.0, 20.0, 0.5, 1.0, &[5.0, 10.0, 15.0, 20.0]),
            ParamKind::Perturbation => {
                ParamRange::new(-4.0, 4.0, 0.5, 1.0, &[-2.0, 0.0, 2.0, 4.0])
            }
            ParamKind::Gain => ParamRange::new(0.0, 100.0, 10.0, 50.0, &[50.0, 100.0]),
            ParamKind::Feedback => ParamRange::new(0.0, 10.0, 0.5, 1.0, &[5.0, 10.0]),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKind {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" | "setpoint" => Ok(ParamKind::Setpoint),
            "d" | "perturbation" => Ok(ParamKind::Perturbation),
            "G" | "g" | "gain" => Ok(ParamKind::Gain),
            "K" | "k" | "feedback" => Ok(ParamKind::Feedback),
            other => Err(ControlError::invalid(format!(
                "unknown parameter '{other}' (expected u, d, G or K)"
            ))),
        }
    }
}

/// Slider range for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// Values labelled on the slider track.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<f64>,
}

impl ParamRange {
    pub fn new(min: f64, max: f64, step: f64, default: f64, marks: &[f64]) -> Self {
        Self {
            min,
            max,
            step,
            default,
            marks: marks.to_vec(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp into range and round to the nearest step from `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    pub fn validate(&self, what: &str) -> ControlResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(ControlError::invalid(format!(
                "{what}: range must satisfy min < max (got [{}, {}])",
                self.min, self.max
            )));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ControlError::invalid(format!(
                "{what}: step must be positive (got {})",
                self.step
            )));
        }
        if !self.contains(self.default) {
            return Err(ControlError::invalid(format!(
                "{what}: default {} outside [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        if let Some(mark) = self.marks.iter().find(|m| !self.contains(**m)) {
            return Err(ControlError::invalid(format!(
                "{what}: mark {mark} outside [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}
