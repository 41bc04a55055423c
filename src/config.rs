use crate::error::{ConnectorError, Result};
use crate::geometry::CurveModel;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the connector animation. Durations are in milliseconds,
/// distances in surface units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectorConfig {
    pub strand_count: usize,
    pub max_stroke_width: f32,
    pub stroke_width_ramp_ms: f32,
    pub max_deviance: f32,
    pub deviance_ramp_ms: f32,
    pub window_start: f32,
    pub window_start_ramp_ms: f32,
    pub window_end: f32,
    pub window_end_ramp_ms: f32,
    pub step: f32,
    pub noise_time_scale_ms: f32,
    pub high_frequency_multiplier: f32,
    pub high_frequency_weight: f32,
    pub marker_radius: f32,
    pub stroke_passes: usize,
    pub exit_threshold: f32,
    pub curve_model: CurveModel,
    pub seed: Option<u64>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            strand_count: 1,
            max_stroke_width: 4.0,
            stroke_width_ramp_ms: 500.0,
            max_deviance: 6.0,
            deviance_ramp_ms: 1000.0,
            window_start: 0.05,
            window_start_ramp_ms: 100.0,
            window_end: 0.9,
            window_end_ramp_ms: 200.0,
            step: 0.03,
            noise_time_scale_ms: 500.0,
            high_frequency_multiplier: 8.0,
            high_frequency_weight: 0.4,
            marker_radius: 5.0,
            stroke_passes: 2,
            exit_threshold: 10.0,
            curve_model: CurveModel::Blended,
            seed: None,
        }
    }
}

impl ConnectorConfig {
    pub fn with_strands(mut self, count: usize) -> Self {
        self.strand_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.strand_count == 0 {
            return Err(invalid("strandCount must be at least 1"));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(invalid("step must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.high_frequency_weight) {
            return Err(invalid("highFrequencyWeight must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.window_start) || !(0.0..=1.0).contains(&self.window_end) {
            return Err(invalid("window bounds must be within [0, 1]"));
        }
        if !(self.noise_time_scale_ms.is_finite() && self.noise_time_scale_ms > 0.0) {
            return Err(invalid("noiseTimeScaleMs must be a positive number"));
        }
        let non_negative = [
            ("maxStrokeWidth", self.max_stroke_width),
            ("strokeWidthRampMs", self.stroke_width_ramp_ms),
            ("maxDeviance", self.max_deviance),
            ("devianceRampMs", self.deviance_ramp_ms),
            ("windowStartRampMs", self.window_start_ramp_ms),
            ("windowEndRampMs", self.window_end_ramp_ms),
            ("highFrequencyMultiplier", self.high_frequency_multiplier),
            ("markerRadius", self.marker_radius),
            ("exitThreshold", self.exit_threshold),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(&format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConnectorError {
    ConnectorError::InvalidConfig(message.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            background: "#312F54".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub connector: ConnectorConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::electric();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            connector: ConnectorConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    stroke_color: Option<String>,
    glow_color: Option<String>,
    glow_blur: Option<f32>,
    marker_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    connector: Option<ConnectorConfig>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => {
                config.render.background = theme.background.clone();
                config.theme = theme;
            }
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.stroke_color {
            config.theme.stroke_color = v;
        }
        if let Some(v) = vars.glow_color {
            config.theme.glow_color = v;
        }
        if let Some(v) = vars.glow_blur {
            config.theme.glow_blur = v;
        }
        if let Some(v) = vars.marker_color {
            config.theme.marker_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    if let Some(connector) = parsed.connector {
        config.connector = connector;
    }

    config.connector.validate()?;
    Ok(config)
}
