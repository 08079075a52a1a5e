//! Watermark task configuration and pre-flight validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;
pub const MIN_OPACITY: f64 = 0.1;
pub const MAX_OPACITY: f64 = 1.0;
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 5.0;
pub const MIN_AMPLITUDE: f64 = 10.0;
pub const MAX_AMPLITUDE: f64 = 200.0;
pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 10;

/// Configuration for one watermarking run.
///
/// Deserialized from a task file with camelCase keys:
/// ```json
/// { "text": "SAMPLE", "fontSize": 40, "color": "#FFFFFF", "opacity": 0.8,
///   "speed": 2.0, "amplitude": 60, "count": 1, "includeTime": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkConfig {
    /// Literal overlay text
    pub text: String,

    /// Font size in pixels (8-72)
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Font color, `#RRGGBB`, `0xRRGGBB` or a color name
    #[serde(default = "default_color")]
    pub color: String,

    /// Text opacity (0.1-1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Drift speed factor (0.1-5.0)
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Drift amplitude in pixels (10-200)
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Number of watermarks (1-10)
    #[serde(default = "default_count")]
    pub count: u32,

    /// Optional path to a font file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Append a live local-clock timestamp to the text
    #[serde(default)]
    pub include_time: bool,
}

fn default_font_size() -> u32 {
    24
}
fn default_color() -> String {
    "white".to_string()
}
fn default_opacity() -> f64 {
    0.5
}
fn default_speed() -> f64 {
    1.0
}
fn default_amplitude() -> f64 {
    50.0
}
fn default_count() -> u32 {
    1
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: default_font_size(),
            color: default_color(),
            opacity: default_opacity(),
            speed: default_speed(),
            amplitude: default_amplitude(),
            count: default_count(),
            font_family: None,
            include_time: false,
        }
    }
}

impl WatermarkConfig {
    /// Create a config for the given text with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_font_family(mut self, path: impl Into<String>) -> Self {
        self.font_family = Some(path.into());
        self
    }

    pub fn with_include_time(mut self, include_time: bool) -> Self {
        self.include_time = include_time;
        self
    }

    /// Validate every field, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut violations = Vec::new();

        if self.text.trim().is_empty() {
            violations.push(ConfigViolation::EmptyText);
        }
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            violations.push(ConfigViolation::FontSize(self.font_size));
        }
        if !is_valid_color(&self.color) {
            violations.push(ConfigViolation::Color(self.color.clone()));
        }
        if !(MIN_OPACITY..=MAX_OPACITY).contains(&self.opacity) {
            violations.push(ConfigViolation::Opacity(self.opacity));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            violations.push(ConfigViolation::Speed(self.speed));
        }
        if !(MIN_AMPLITUDE..=MAX_AMPLITUDE).contains(&self.amplitude) {
            violations.push(ConfigViolation::Amplitude(self.amplitude));
        }
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.count) {
            violations.push(ConfigViolation::Count(self.count));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { violations })
        }
    }
}

/// Accepts `#RRGGBB[AA]`, `0xRRGGBB[AA]` or an alphabetic color name.
fn is_valid_color(color: &str) -> bool {
    let hex = color
        .strip_prefix('#')
        .or_else(|| color.strip_prefix("0x"))
        .or_else(|| color.strip_prefix("0X"));

    match hex {
        Some(digits) => {
            matches!(digits.len(), 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => {
            !color.is_empty() && color.len() <= 32 && color.chars().all(|c| c.is_ascii_alphabetic())
        }
    }
}

/// A single out-of-range config field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigViolation {
    #[error("text must not be empty")]
    EmptyText,

    #[error("fontSize must be between {min} and {max} (got {0})", min = MIN_FONT_SIZE, max = MAX_FONT_SIZE)]
    FontSize(u32),

    #[error("color must be #RRGGBB, 0xRRGGBB or a color name (got '{0}')")]
    Color(String),

    #[error("opacity must be between {min} and {max} (got {0})", min = MIN_OPACITY, max = MAX_OPACITY)]
    Opacity(f64),

    #[error("speed must be between {min} and {max} (got {0})", min = MIN_SPEED, max = MAX_SPEED)]
    Speed(f64),

    #[error("amplitude must be between {min} and {max} (got {0})", min = MIN_AMPLITUDE, max = MAX_AMPLITUDE)]
    Amplitude(f64),

    #[error("count must be between {min} and {max} (got {0})", min = MIN_COUNT, max = MAX_COUNT)]
    Count(u32),
}

impl ConfigViolation {
    /// Name of the offending field as it appears in task files.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyText => "text",
            Self::FontSize(_) => "fontSize",
            Self::Color(_) => "color",
            Self::Opacity(_) => "opacity",
            Self::Speed(_) => "speed",
            Self::Amplitude(_) => "amplitude",
            Self::Count(_) => "count",
        }
    }
}

/// Every violation found in one config.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid watermark config: {}", join_violations(.violations))]
pub struct ConfigValidationError {
    pub violations: Vec<ConfigViolation>,
}

impl ConfigValidationError {
    /// Field names of all violations, in check order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(ConfigViolation::field).collect()
    }
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WatermarkConfig {
        WatermarkConfig::new("SAMPLE")
            .with_font_size(40)
            .with_color("#FFFFFF")
            .with_opacity(0.8)
            .with_speed(2.0)
            .with_amplitude(60.0)
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_whitespace_text_rejected() {
        let err = WatermarkConfig::new("   ").validate().unwrap_err();
        assert_eq!(err.violations, vec![ConfigViolation::EmptyText]);
    }

    #[test]
    fn test_violations_are_aggregated() {
        let err = sample().with_font_size(200).with_count(20).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["fontSize", "count"]);

        let message = err.to_string();
        assert!(message.contains("fontSize"));
        assert!(message.contains("200"));
        assert!(message.contains("count"));
        assert!(message.contains("20"));
    }

    #[test]
    fn test_opacity_and_count_reported_together() {
        let err = sample().with_opacity(1.5).with_count(0).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["opacity", "count"]);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let config = sample()
            .with_font_size(8)
            .with_opacity(1.0)
            .with_speed(0.1)
            .with_amplitude(200.0)
            .with_count(10);
        assert!(config.validate().is_ok());

        let config = sample().with_font_size(72).with_opacity(0.1).with_speed(5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = sample().with_speed(f64::NAN).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["speed"]);
    }

    #[test]
    fn test_color_formats() {
        assert!(is_valid_color("#FFFFFF"));
        assert!(is_valid_color("#ff00ff80"));
        assert!(is_valid_color("0x00FF00"));
        assert!(is_valid_color("white"));
        assert!(!is_valid_color("#FFF"));
        assert!(!is_valid_color("red:fontsize=99"));
        assert!(!is_valid_color(""));
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let config: WatermarkConfig = serde_json::from_str(
            r#"{"text": "SAMPLE", "fontSize": 40, "includeTime": true, "fontFamily": "/f.ttf"}"#,
        )
        .unwrap();

        assert_eq!(config.font_size, 40);
        assert!(config.include_time);
        assert_eq!(config.font_family.as_deref(), Some("/f.ttf"));
        assert_eq!(config.count, 1);
        assert_eq!(config.color, "white");
    }
}
