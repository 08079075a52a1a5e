//! Encoder progress parsed from stderr status lines.
//!
//! FFmpeg's status line looks like
//! `frame=  240 fps= 60 q=28.0 size=  512kB time=00:00:04.00 bitrate=... speed=2.0x`
//! and is rewritten in place with `\r`. Only the `time=` token is required;
//! `speed=` is picked up when present.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use driftmark_models::parse_timestamp;

static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("valid time token regex")
});

static SPEED_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x").expect("valid speed token regex")
});

/// Progress information from the encoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeProgress {
    /// Output time in seconds
    pub out_time_secs: f64,
    /// Output time as reported (HH:MM:SS.ff)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime), 0 when unknown
    pub speed: f64,
}

impl EncodeProgress {
    /// Calculate progress percentage given total duration in seconds.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if total_secs <= 0.0 {
            return 0.0;
        }
        ((self.out_time_secs / total_secs) * 100.0).clamp(0.0, 100.0)
    }

    /// Estimate time remaining in seconds.
    pub fn eta_seconds(&self, total_secs: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_secs <= 0.0 || total_secs <= 0.0 {
            return None;
        }

        let remaining = total_secs - self.out_time_secs;
        if remaining <= 0.0 {
            return Some(0.0);
        }

        Some(remaining / self.speed)
    }
}

/// Extract progress from one stderr segment, if it carries a time token.
pub fn parse_progress_line(line: &str) -> Option<EncodeProgress> {
    let out_time = TIME_TOKEN.captures(line)?.get(1)?.as_str();
    let out_time_secs = parse_timestamp(out_time).ok()?;

    let speed = SPEED_TOKEN
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);

    Some(EncodeProgress {
        out_time_secs,
        out_time: out_time.to_string(),
        speed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        let line = "frame=  240 fps= 60 q=28.0 size=     512kB time=00:00:04.00 bitrate=1048.6kbits/s speed=2.01x";
        let progress = parse_progress_line(line).unwrap();
        assert_eq!(progress.out_time, "00:00:04.00");
        assert!((progress.out_time_secs - 4.0).abs() < 1e-9);
        assert!((progress.speed - 2.01).abs() < 1e-9);
    }

    #[test]
    fn test_parse_without_speed() {
        let progress = parse_progress_line("size=N/A time=01:02:03.50 bitrate=N/A speed=N/A").unwrap();
        assert!((progress.out_time_secs - 3723.5).abs() < 1e-9);
        assert_eq!(progress.speed, 0.0);
    }

    #[test]
    fn test_non_progress_lines() {
        assert!(parse_progress_line("Error opening output file out.mp4.").is_none());
        assert!(parse_progress_line("time=N/A bitrate=N/A").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn test_progress_percentage() {
        let progress = EncodeProgress {
            out_time_secs: 5.0,
            ..Default::default()
        };

        assert!((progress.percentage(10.0) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5.0) - 100.0).abs() < 0.01);
        assert!((progress.percentage(2.0) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0.0), 0.0);
    }

    #[test]
    fn test_eta_calculation() {
        let progress = EncodeProgress {
            out_time_secs: 5.0,
            speed: 2.0, // 2x realtime
            ..Default::default()
        };

        // 5 seconds remaining at 2x speed = 2.5 seconds ETA
        let eta = progress.eta_seconds(10.0).unwrap();
        assert!((eta - 2.5).abs() < 0.01);
        assert_eq!(progress.eta_seconds(0.0), None);
    }
}
