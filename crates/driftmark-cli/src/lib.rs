//! Command line driver for moving text watermarks.
//!
//! This crate provides:
//! - Environment configuration
//! - Task file loading and flag overrides
//! - Structured run logging
//! - Exit status mapping

pub mod config;
pub mod error;
pub mod logging;
pub mod task;

pub use config::CliConfig;
pub use error::{exit_code_for, CliError, CliResult};
pub use logging::RunLogger;
pub use task::{load_task, resolve_config, WatermarkArgs};
