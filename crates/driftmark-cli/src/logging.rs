//! Structured run logging utilities.
//!
//! Tags every lifecycle event of one watermarking run with a run ID and the
//! input file so concurrent or interleaved runs stay distinguishable.

use std::path::Path;
use tracing::{error, info, warn, Span};
use uuid::Uuid;

use driftmark_media::MediaError;

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    input: String,
}

impl RunLogger {
    /// Create a logger with a fresh run ID.
    pub fn new(input: &Path) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), input)
    }

    /// Create a logger with a caller-chosen run ID.
    pub fn with_id(run_id: impl Into<String>, input: &Path) -> Self {
        Self {
            run_id: run_id.into(),
            input: input.display().to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Run started: {}", message
        );
    }

    /// Log a warning during the run.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            input = %self.input,
            "Run warning: {}", message
        );
    }

    /// Log a run failure.
    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            input = %self.input,
            "Run error: {}", message
        );
    }

    /// Log a pipeline failure, attaching the encoder's captured stderr
    /// when there is one.
    pub fn log_failure(&self, err: &MediaError) {
        match err.stderr().filter(|s| !s.trim().is_empty()) {
            Some(stderr) => error!(
                run_id = %self.run_id,
                input = %self.input,
                stderr = %stderr,
                "Run error: {}", err
            ),
            None => self.log_error(&err.to_string()),
        }
    }

    /// Log the completion of a run.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Create a tracing span for this run.
    ///
    /// Pipeline logs emitted inside the span carry the run ID.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            input = %self.input
        )
    }
}
