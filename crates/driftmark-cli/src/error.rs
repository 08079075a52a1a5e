//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use driftmark_media::MediaError;

pub type CliResult<T> = Result<T, CliError>;

/// Process exit status for runtime failures.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit status for rejected task configurations.
pub const EXIT_INVALID_CONFIG: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read task file {path}: {source}")]
    TaskRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid task file {path}: {source}")]
    TaskParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl CliError {
    /// Exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TaskParse { .. } | Self::Media(MediaError::InvalidConfig(_)) => {
                EXIT_INVALID_CONFIG
            }
            _ => EXIT_FAILURE,
        }
    }
}

/// Exit status for any error surfaced by the binary.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    match err.downcast_ref::<MediaError>() {
        Some(MediaError::InvalidConfig(_)) => EXIT_INVALID_CONFIG,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftmark_models::WatermarkConfig;

    fn validation_error() -> MediaError {
        let err = WatermarkConfig::new("").validate().unwrap_err();
        MediaError::InvalidConfig(err)
    }

    #[test]
    fn test_validation_exits_with_two() {
        assert_eq!(CliError::from(validation_error()).exit_code(), EXIT_INVALID_CONFIG);
        assert_eq!(exit_code_for(&anyhow::Error::new(validation_error())), EXIT_INVALID_CONFIG);
    }

    #[test]
    fn test_runtime_failures_exit_with_one() {
        let err = CliError::from(MediaError::FileNotFound(PathBuf::from("clip.mp4")));
        assert_eq!(err.exit_code(), EXIT_FAILURE);

        let err = anyhow::Error::new(MediaError::ffmpeg_failed("boom", None, Some(1)));
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = anyhow::Error::new(CliError::from(validation_error())).context("run failed");
        assert_eq!(exit_code_for(&err), EXIT_INVALID_CONFIG);
    }
}
