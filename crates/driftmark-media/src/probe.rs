//! FFprobe frame metadata with a degraded-mode fallback.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use driftmark_models::VideoInfo;

use crate::error::{MediaError, MediaResult};
use crate::tools::ToolPaths;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<Numeric>,
}

/// FFprobe reports durations as strings, some builds as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Queries width, height and duration of the first video stream.
#[derive(Debug, Clone)]
pub struct MetadataProbe {
    ffprobe: PathBuf,
}

impl MetadataProbe {
    /// Create a probe using the given ffprobe binary.
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    /// Probe a file, substituting 1920x1080 / 0s on any failure.
    ///
    /// Never fails: a missing prober, a non-zero exit, malformed JSON or a
    /// file without a video stream all degrade to [`VideoInfo::fallback`].
    pub async fn probe(&self, path: impl AsRef<Path>) -> VideoInfo {
        let path = path.as_ref();
        match self.try_probe(path).await {
            Ok(info) => {
                debug!(
                    path = %path.display(),
                    width = info.width,
                    height = info.height,
                    duration = info.duration,
                    "Probed video"
                );
                info
            }
            Err(e) => {
                let fallback = VideoInfo::fallback();
                warn!(
                    path = %path.display(),
                    error = %e,
                    width = fallback.width,
                    height = fallback.height,
                    "Video probe failed, using default frame size"
                );
                fallback
            }
        }
    }

    /// Probe a file, surfacing the failure reason.
    pub async fn try_probe(&self, path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
        let output = Command::new(&self.ffprobe)
            .args(probe_args(path.as_ref()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| MediaError::ffprobe_failed(format!("Failed to spawn FFprobe: {}", e), None))?;

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                format!("FFprobe exited with {}", output.status),
                Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            ));
        }

        parse_probe_output(&output.stdout)
    }
}

/// Probe with the ffprobe resolved from the environment or PATH.
pub async fn probe_video(path: impl AsRef<Path>) -> VideoInfo {
    MetadataProbe::new(ToolPaths::from_env().ffprobe).probe(path).await
}

/// Build ffprobe arguments for the first video stream of `path`.
pub fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=width,height,duration".to_string(),
        path.to_string_lossy().into_owned(),
    ]
}

/// Parse ffprobe JSON into video info.
///
/// Width and height are required; a missing or unparsable duration is
/// reported as zero.
pub fn parse_probe_output(stdout: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(MediaError::InvalidVideo(
                "Video stream has no frame dimensions".to_string(),
            ))
        }
    };

    let duration = stream
        .duration
        .as_ref()
        .and_then(Numeric::as_f64)
        .unwrap_or(0.0);

    Ok(VideoInfo::new(width, height, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{"streams": [{"width": 1280, "height": 720, "duration": "12.480000"}]}"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert!((info.duration - 12.48).abs() < 1e-9);
    }

    #[test]
    fn test_parse_numeric_duration() {
        let json = br#"{"streams": [{"width": 640, "height": 480, "duration": 3.5}]}"#;
        assert_eq!(parse_probe_output(json).unwrap().duration, 3.5);
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let json = br#"{"streams": [{"width": 640, "height": 480}]}"#;
        assert_eq!(parse_probe_output(json).unwrap(), VideoInfo::new(640, 480, 0.0));
    }

    #[test]
    fn test_no_streams_is_error() {
        assert!(matches!(
            parse_probe_output(br#"{"streams": []}"#),
            Err(MediaError::InvalidVideo(_))
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(MediaError::InvalidVideo(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(MediaError::JsonParse(_))
        ));
    }

    #[test]
    fn test_probe_args_select_first_video_stream() {
        let args = probe_args(Path::new("clip.mp4"));
        assert!(args.windows(2).any(|w| w == ["-select_streams", "v:0"]));
        assert!(args.windows(2).any(|w| w == ["-print_format", "json"]));
        assert_eq!(args.last().map(String::as_str), Some("clip.mp4"));
    }

    #[tokio::test]
    async fn test_missing_prober_falls_back() {
        let probe = MetadataProbe::new("/nonexistent/driftmark/ffprobe");
        let info = probe.probe("clip.mp4").await;
        assert_eq!(info, VideoInfo::fallback());
        assert_eq!((info.width, info.height, info.duration), (1920, 1080, 0.0));
    }

    #[tokio::test]
    async fn test_probe_video_missing_file_falls_back() {
        let info = probe_video("/nonexistent/driftmark/clip.mp4").await;
        assert_eq!(info, VideoInfo::fallback());
    }
}
