//! CLI configuration from the environment.

use std::path::PathBuf;

use driftmark_media::tools::{FFMPEG_PATH_ENV, FFPROBE_PATH_ENV};
use driftmark_media::ToolPaths;

/// Environment variable for the default output directory.
pub const OUTPUT_DIR_ENV: &str = "DRIFTMARK_OUTPUT_DIR";
/// `json` switches log output to JSON lines.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// ffmpeg binary override
    pub ffmpeg_path: Option<PathBuf>,
    /// ffprobe binary override
    pub ffprobe_path: Option<PathBuf>,
    /// Output directory when `--output-dir` is not given
    pub output_dir: PathBuf,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            output_dir: PathBuf::from("./output"),
            log_json: false,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            ffmpeg_path: non_empty(FFMPEG_PATH_ENV).map(PathBuf::from),
            ffprobe_path: non_empty(FFPROBE_PATH_ENV).map(PathBuf::from),
            output_dir: non_empty(OUTPUT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./output")),
            log_json: lookup(LOG_FORMAT_ENV)
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        }
    }

    /// Resolve the external binaries, honoring overrides.
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths::resolve(self.ffmpeg_path.as_deref(), self.ffprobe_path.as_deref())
    }
}
