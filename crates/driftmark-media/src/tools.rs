//! External tool resolution for ffmpeg/ffprobe.
//!
//! Resolution order:
//! 1) Explicit path (environment override), if it exists
//! 2) `which` lookup on PATH
//! 3) Bare program name; a failed spawn is reported by the caller

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Environment variable overriding the ffmpeg binary.
pub const FFMPEG_PATH_ENV: &str = "DRIFTMARK_FFMPEG_PATH";
/// Environment variable overriding the ffprobe binary.
pub const FFPROBE_PATH_ENV: &str = "DRIFTMARK_FFPROBE_PATH";

/// Paths of the external binaries used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: resolve_tool(None, "ffmpeg"),
            ffprobe: resolve_tool(None, "ffprobe"),
        }
    }
}

impl ToolPaths {
    /// Use the given binaries as-is.
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Resolve binaries, honoring optional explicit overrides.
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Self {
        Self {
            ffmpeg: resolve_tool(ffmpeg, "ffmpeg"),
            ffprobe: resolve_tool(ffprobe, "ffprobe"),
        }
    }

    /// Resolve binaries from `DRIFTMARK_FFMPEG_PATH` / `DRIFTMARK_FFPROBE_PATH`.
    pub fn from_env() -> Self {
        let ffmpeg = std::env::var_os(FFMPEG_PATH_ENV).map(PathBuf::from);
        let ffprobe = std::env::var_os(FFPROBE_PATH_ENV).map(PathBuf::from);
        Self::resolve(ffmpeg.as_deref(), ffprobe.as_deref())
    }

    /// Verify both binaries exist.
    pub fn check(&self) -> MediaResult<()> {
        if !is_available(&self.ffmpeg) {
            return Err(MediaError::FfmpegNotFound);
        }
        if !is_available(&self.ffprobe) {
            return Err(MediaError::FfprobeNotFound);
        }
        Ok(())
    }
}

/// Resolve one tool path.
fn resolve_tool(explicit: Option<&Path>, default_name: &str) -> PathBuf {
    if let Some(path) = explicit {
        if path.exists() {
            return path.to_path_buf();
        }
        debug!(path = %path.display(), tool = default_name, "Tool override does not exist, falling back to PATH");
    }

    match which::which(default_name) {
        Ok(path) => path,
        Err(_) => PathBuf::from(default_name),
    }
}

/// Whether a resolved tool path can be spawned.
fn is_available(path: &Path) -> bool {
    path.is_file() || which::which(path).is_ok()
}
