use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::frame::PixelFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// "raw", "image" or "synthetic".
    pub mode: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Named sensor preset; overridden by explicit width/height.
    #[serde(default)]
    pub frame_size: Option<FrameSize>,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub height: Option<usize>,
    #[serde(default = "default_format")]
    pub format: PixelFormat,
    /// Synthetic pattern: "flat", "step" or "checker".
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Number of frames the synthetic source yields.
    #[serde(default = "default_frame_count")]
    pub frames: u64,
}

/// Sensor frame-size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSize {
    Qvga,
    Vga,
    Svga,
    Xga,
    Hd,
    Uxga,
}

impl FrameSize {
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            FrameSize::Qvga => (320, 240),
            FrameSize::Vga => (640, 480),
            FrameSize::Svga => (800, 600),
            FrameSize::Xga => (1024, 768),
            FrameSize::Hd => (1280, 720),
            FrameSize::Uxga => (1600, 1200),
        }
    }
}

impl SourceConfig {
    /// Resolve the frame dimensions from explicit width/height, falling back
    /// to the preset. Image sources may leave both unset.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        let preset = self.frame_size.map(FrameSize::dimensions);
        match (self.width, self.height, preset) {
            (Some(w), Some(h), _) => Some((w, h)),
            (w, h, Some((pw, ph))) => Some((w.unwrap_or(pw), h.unwrap_or(ph))),
            _ => None,
        }
    }
}

/// Sampling stride of one scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StrideConfig {
    /// Same pixel step on both axes.
    Fixed { step: usize },
    /// At most `columns` x `rows` samples across the whole frame.
    Adaptive { columns: usize, rows: usize },
}

impl StrideConfig {
    fn is_valid(&self) -> bool {
        match *self {
            StrideConfig::Fixed { step } => step > 0,
            StrideConfig::Adaptive { columns, rows } => columns > 0 && rows > 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    #[serde(default = "default_sharpness_stride")]
    pub sharpness_stride: StrideConfig,
    #[serde(default = "default_text_stride")]
    pub text_stride: StrideConfig,
    #[serde(default = "default_quality_stride")]
    pub quality_stride: StrideConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            sharpness_stride: default_sharpness_stride(),
            text_stride: default_text_stride(),
            quality_stride: default_quality_stride(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// "none", "threshold" or "relative".
    #[serde(default = "default_gate_kind")]
    pub kind: String,
    #[serde(default = "default_gate_metric")]
    pub metric: String,
    /// Absolute floor for the threshold gate.
    #[serde(default)]
    pub min_score: f32,
    /// Relative gate keeps a frame when `score >= keep_ratio * ema`.
    #[serde(default = "default_keep_ratio")]
    pub keep_ratio: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_warmup_frames")]
    pub warmup_frames: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            kind: default_gate_kind(),
            metric: default_gate_metric(),
            min_score: 0.0,
            keep_ratio: default_keep_ratio(),
            alpha: default_alpha(),
            warmup_frames: default_warmup_frames(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), mode = config.source.mode, "config loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((w, h)) = self.source.dimensions() {
            if w == 0 || h == 0 {
                return Err(ConfigError::Invalid(format!(
                    "frame size must be non-zero, got {w}x{h}"
                )));
            }
        }
        if self.scoring.metrics.is_empty() {
            return Err(ConfigError::Invalid("scoring.metrics is empty".into()));
        }
        for (name, stride) in [
            ("sharpness_stride", &self.scoring.sharpness_stride),
            ("text_stride", &self.scoring.text_stride),
            ("quality_stride", &self.scoring.quality_stride),
        ] {
            if !stride.is_valid() {
                return Err(ConfigError::Invalid(format!("scoring.{name} must be non-zero")));
            }
        }
        if self.gate.alpha.is_nan() || self.gate.alpha <= 0.0 || self.gate.alpha > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "gate.alpha must be in (0, 1], got {}",
                self.gate.alpha
            )));
        }
        if self.gate.keep_ratio.is_nan() || self.gate.keep_ratio < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gate.keep_ratio must be non-negative, got {}",
                self.gate.keep_ratio
            )));
        }
        if self.gate.kind != "none" && !self.scoring.metrics.contains(&self.gate.metric) {
            return Err(ConfigError::Invalid(format!(
                "gate metric {} is not in scoring.metrics",
                self.gate.metric
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_format() -> PixelFormat {
    PixelFormat::Grayscale
}
fn default_pattern() -> String {
    "step".into()
}
fn default_frame_count() -> u64 {
    10
}
fn default_metrics() -> Vec<String> {
    vec![
        "sharpness".into(),
        "text_sharpness".into(),
        "quality".into(),
    ]
}
fn default_sharpness_stride() -> StrideConfig {
    StrideConfig::Adaptive {
        columns: 20,
        rows: 15,
    }
}
fn default_text_stride() -> StrideConfig {
    StrideConfig::Fixed { step: 5 }
}
fn default_quality_stride() -> StrideConfig {
    StrideConfig::Fixed { step: 10 }
}
fn default_gate_kind() -> String {
    "none".into()
}
fn default_gate_metric() -> String {
    "sharpness".into()
}
fn default_keep_ratio() -> f64 {
    0.5
}
fn default_alpha() -> f64 {
    0.05
}
fn default_warmup_frames() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}
