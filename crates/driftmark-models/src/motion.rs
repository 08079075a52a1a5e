//! Per-watermark motion parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shape of the drift path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    /// Wide sine sweep on x, small residual drift on y.
    HorizontalDominant,
    /// Wide sine sweep on y, small residual drift on x.
    VerticalDominant,
    /// Comparable sine on x and cosine on y.
    Elliptical,
}

impl MotionKind {
    /// Select a motion kind from a uniform draw in [0, 1).
    pub fn from_unit(value: f64) -> Self {
        if value < 0.3 {
            Self::HorizontalDominant
        } else if value < 0.6 {
            Self::VerticalDominant
        } else {
            Self::Elliptical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HorizontalDominant => "horizontal_dominant",
            Self::VerticalDominant => "vertical_dominant",
            Self::Elliptical => "elliptical",
        }
    }
}

impl std::fmt::Display for MotionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Randomized values that shape one watermark's trajectory.
///
/// Generated fresh for every watermark of every run. Rendering the same
/// params twice yields identical expressions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MotionParams {
    /// Deterministic phase spread across watermarks (radians)
    pub phase_offset: f64,
    /// Free-running phase seed for the x axis (radians)
    pub seed_x: f64,
    /// Free-running phase seed for the y axis (radians)
    pub seed_y: f64,
    /// Direction of the x sweep (+1 or -1)
    pub direction_x: f64,
    /// Direction of the y sweep (+1 or -1)
    pub direction_y: f64,
    /// Speed multiplier for x, in [0.3, 0.7]
    pub speed_x: f64,
    /// Speed multiplier for y, in [0.3, 0.7]
    pub speed_y: f64,
    /// Amplitude multiplier for x, in [0.8, 1.2]
    pub amplitude_x: f64,
    /// Amplitude multiplier for y, in [0.8, 1.2]
    pub amplitude_y: f64,
    /// Path shape
    pub kind: MotionKind,
}
