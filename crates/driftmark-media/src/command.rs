//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use driftmark_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, EncodeProgress};

/// Non-progress stderr lines kept for error reports.
pub const DIAGNOSTIC_TAIL_LINES: usize = 200;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Apply codec, preset, quality and audio settings.
    pub fn encoding(self, encoding: &EncodingConfig) -> Self {
        self.output_args(encoding.to_ffmpeg_args())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());

        // Log level
        args.push("-loglevel".to_string());
        args.push(self.log_level.clone());

        // Status line on stderr even when the log level hides info
        args.push("-stats".to_string());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runs FFmpeg to completion, reporting progress from stderr.
///
/// There is no timeout and no cancellation: a hung encoder hangs the
/// caller.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg: PathBuf,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRunner {
    /// Create a runner for the given ffmpeg binary.
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    ///
    /// Succeeds only on exit code 0. Any other exit, or a failure to spawn,
    /// yields [`MediaError::FfmpegFailed`] carrying the captured stderr.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: FnMut(EncodeProgress) + Send + 'static,
    {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.ffmpeg.display(), args.join(" "));

        let mut child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None)
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr not captured"))?;

        // Spawn stderr draining task
        let stderr_handle = tokio::spawn(drain_stderr(stderr, progress_callback));

        let status = child.wait().await;

        let diagnostics = stderr_handle
            .await
            .map_err(|e| MediaError::internal(format!("stderr reader task failed: {}", e)))?;

        let status = status.map_err(|e| {
            MediaError::ffmpeg_failed(
                format!("Failed to wait for FFmpeg: {}", e),
                Some(diagnostics.clone()),
                None,
            )
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                format!("FFmpeg exited with {}", status),
                Some(diagnostics),
                status.code(),
            ))
        }
    }
}

/// Splits a byte stream into `\r`/`\n` terminated segments.
#[derive(Debug, Default)]
struct SegmentSplitter {
    pending: Vec<u8>,
}

impl SegmentSplitter {
    fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut segments = Vec::new();
        for &byte in bytes {
            if byte == b'\r' || byte == b'\n' {
                if !self.pending.is_empty() {
                    segments.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
            } else {
                self.pending.push(byte);
            }
        }
        segments
    }

    fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// Read stderr until EOF, forwarding progress and returning the tail of
/// all other output.
async fn drain_stderr<R, F>(mut reader: R, mut on_progress: F) -> String
where
    R: AsyncRead + Unpin,
    F: FnMut(EncodeProgress),
{
    let mut splitter = SegmentSplitter::default();
    let mut tail: VecDeque<String> = VecDeque::new();
    let mut buf = [0u8; 4096];

    let mut handle = |segment: String| {
        if let Some(progress) = parse_progress_line(&segment) {
            on_progress(progress);
        } else if !segment.trim().is_empty() {
            if tail.len() == DIAGNOSTIC_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(segment);
        }
    };

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                // Dropping the reader closes the pipe so the child cannot
                // block on a full stderr buffer.
                warn!(error = %e, "Failed to read FFmpeg stderr, dropping the pipe");
                break;
            }
        };
        for segment in splitter.feed(&buf[..n]) {
            handle(segment);
        }
    }
    if let Some(rest) = splitter.finish() {
        handle(rest);
    }

    tail.into_iter().collect::<Vec<_>>().join("\n")
}
