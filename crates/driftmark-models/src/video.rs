//! Probed video frame information.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Width used when the source cannot be probed.
pub const FALLBACK_WIDTH: u32 = 1920;
/// Height used when the source cannot be probed.
pub const FALLBACK_HEIGHT: u32 = 1080;

/// Frame dimensions and duration of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
}

impl VideoInfo {
    /// Create video info, clamping dimensions to at least one pixel.
    pub fn new(width: u32, height: u32, duration: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
        }
    }

    /// Degraded-mode values used when probing fails.
    pub fn fallback() -> Self {
        Self {
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
            duration: 0.0,
        }
    }

    /// Shorter of the two frame dimensions, in pixels.
    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback() {
        let info = VideoInfo::fallback();
        assert_eq!(info, VideoInfo::new(1920, 1080, 0.0));
        assert_eq!(VideoInfo::default(), info);
    }

    #[test]
    fn test_new_sanitizes() {
        let info = VideoInfo::new(0, 720, f64::NAN);
        assert_eq!(info.width, 1);
        assert_eq!(info.duration, 0.0);
        assert_eq!(VideoInfo::new(1280, 720, -3.0).duration, 0.0);
    }

    #[test]
    fn test_min_dimension() {
        assert_eq!(VideoInfo::new(1280, 720, 10.0).min_dimension(), 720);
    }
}
