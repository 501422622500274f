//! Dashboard configuration: layout text, grid, sliders and chart axes.

use std::path::Path;

use fb_controls::{
    DEFAULT_HORIZON, DEFAULT_SAMPLE_COUNT, EvaluatorOptions, FeedbackParams, ParamKind, ParamRange,
    SimulationRequest, SimulationResult,
};
use fb_sim::IntegratorType;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One slider of the parameter panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderDef {
    pub param: ParamKind,
    pub label: String,
    pub range: ParamRange,
}

impl SliderDef {
    pub fn reference(param: ParamKind) -> Self {
        Self {
            param,
            label: param.label().to_string(),
            range: param.reference_range(),
        }
    }
}

/// Axes and title of the trajectory chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDef {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Fixed `[min, max]` of the y axis.
    pub y_range: [f64; 2],
    /// Fixed `[min, max]` of the x axis; unset fits the axis to the samples.
    pub x_range: Option<[f64; 2]>,
}

impl Default for ChartDef {
    fn default() -> Self {
        Self {
            title: "Open-loop vs closed-loop".to_string(),
            x_label: "Time".to_string(),
            y_label: "y".to_string(),
            y_range: [0.0, 20.0],
            x_range: None,
        }
    }
}

impl ChartDef {
    /// X axis bounds for `result`, `None` when there is nothing to fit.
    pub fn x_bounds(&self, result: &SimulationResult) -> Option<[f64; 2]> {
        if let Some(range) = self.x_range {
            return Some(range);
        }
        let (first, last) = (result.first()?, result.last()?);
        Some([first.time, last.time])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Markdown shown above the chart.
    pub description: String,
    pub horizon: f64,
    pub sample_count: usize,
    pub integrator: IntegratorType,
    pub sliders: Vec<SliderDef>,
    pub chart: ChartDef,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Feedback control".to_string(),
            description: "### Feedback control\n\nDifferent types of feedback control".to_string(),
            horizon: DEFAULT_HORIZON,
            sample_count: DEFAULT_SAMPLE_COUNT,
            integrator: IntegratorType::default(),
            sliders: ParamKind::ALL.into_iter().map(SliderDef::reference).collect(),
            chart: ChartDef::default(),
        }
    }
}

impl DashboardConfig {
    /// Slider defaults, falling back to the reference default for a missing slider.
    pub fn default_params(&self) -> FeedbackParams {
        let mut params = FeedbackParams::default();
        for slider in &self.sliders {
            params.set(slider.param, slider.range.default);
        }
        params
    }

    pub fn request(&self, params: FeedbackParams) -> SimulationRequest {
        SimulationRequest::new(self.horizon, self.sample_count, params)
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            integrator: self.integrator,
            ..EvaluatorOptions::default()
        }
    }
}

/// Load and validate a configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<DashboardConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: DashboardConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;

    validate_config(&config)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Validate and write a configuration as YAML.
pub fn save_config(path: &Path, config: &DashboardConfig) -> AppResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

pub fn validate_config(config: &DashboardConfig) -> AppResult<()> {
    if !config.horizon.is_finite() || config.horizon <= 0.0 {
        return Err(AppError::Validation(format!(
            "horizon must be positive (got {})",
            config.horizon
        )));
    }
    if config.sample_count < 2 {
        return Err(AppError::Validation(format!(
            "sample_count must be at least 2 (got {})",
            config.sample_count
        )));
    }

    for kind in ParamKind::ALL {
        let count = config.sliders.iter().filter(|s| s.param == kind).count();
        if count != 1 {
            return Err(AppError::Validation(format!(
                "expected exactly one slider for {}, found {}",
                kind, count
            )));
        }
    }

    for slider in &config.sliders {
        slider
            .range
            .validate(&slider.label)
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    if let Some([x_min, x_max]) = config.chart.x_range
        && !(x_min.is_finite() && x_max.is_finite() && x_min < x_max)
    {
        return Err(AppError::Validation(format!(
            "chart x_range must satisfy min < max (got [{}, {}])",
            x_min, x_max
        )));
    }

    let [y_min, y_max] = config.chart.y_range;
    if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
        return Err(AppError::Validation(format!(
            "chart y_range must satisfy min < max (got [{}, {}])",
            y_min, y_max
        )));
    }

    Ok(())
}
