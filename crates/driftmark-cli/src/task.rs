//! Watermark task assembly from a JSON task file and command line flags.

use clap::Args;
use std::path::{Path, PathBuf};

use driftmark_models::WatermarkConfig;

use crate::error::{CliError, CliResult};

/// Watermark settings accepted on the command line.
///
/// Flags override the matching keys of a task file.
#[derive(Debug, Clone, Default, Args)]
pub struct WatermarkArgs {
    /// Watermark text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Font size in pixels (8-72)
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Font color (#RRGGBB, 0xRRGGBB or a name)
    #[arg(long)]
    pub color: Option<String>,

    /// Opacity (0.1-1.0)
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Drift speed (0.1-5.0)
    #[arg(long)]
    pub speed: Option<f64>,

    /// Drift amplitude in pixels (10-200)
    #[arg(long)]
    pub amplitude: Option<f64>,

    /// Number of watermarks (1-10)
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Font file
    #[arg(long)]
    pub font_family: Option<PathBuf>,

    /// Append a live clock to the text
    #[arg(long)]
    pub include_time: bool,
}

impl WatermarkArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, mut config: WatermarkConfig) -> WatermarkConfig {
        if let Some(text) = &self.text {
            config.text = text.clone();
        }
        if let Some(font_size) = self.font_size {
            config.font_size = font_size;
        }
        if let Some(color) = &self.color {
            config.color = color.clone();
        }
        if let Some(opacity) = self.opacity {
            config.opacity = opacity;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(amplitude) = self.amplitude {
            config.amplitude = amplitude;
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(font) = &self.font_family {
            config.font_family = Some(font.to_string_lossy().into_owned());
        }
        if self.include_time {
            config.include_time = true;
        }
        config
    }
}

/// Parse a JSON task file.
pub fn load_task(path: &Path) -> CliResult<WatermarkConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::TaskRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| CliError::TaskParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Task file (if any) with command line overrides applied. Not validated.
pub fn resolve_config(task: Option<&Path>, args: &WatermarkArgs) -> CliResult<WatermarkConfig> {
    let base = match task {
        Some(path) => load_task(path)?,
        None => WatermarkConfig::default(),
    };
    Ok(args.apply(base))
}
