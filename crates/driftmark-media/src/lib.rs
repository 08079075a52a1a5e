#![deny(unreachable_patterns)]
//! Moving text watermarks over the FFmpeg CLI.
//!
//! This crate provides:
//! - Non-overlapping watermark layout on frames of any size
//! - Randomized, closed-form drift trajectories rendered as FFmpeg expressions
//! - drawtext filter graph assembly with full escaping
//! - Type-safe FFmpeg command building and a progress-reporting runner
//! - FFprobe metadata with a degraded-mode fallback

pub mod command;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod layout;
pub mod motion;
pub mod probe;
pub mod progress;
pub mod random;
pub mod tools;
pub mod watermark;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filters::{DrawTextStanza, FilterGraphBuilder};
pub use fs_utils::{prepare_output_dir, watermarked_output_path};
pub use layout::{LayoutPlanner, PlacementOutcome, TextFootprint};
pub use motion::{MotionSynthesizer, Trajectory};
pub use probe::{probe_video, MetadataProbe};
pub use progress::EncodeProgress;
pub use random::{RandomSource, RngSource, SequenceSource};
pub use tools::ToolPaths;
pub use watermark::{compose_filter_graph, ComposedGraph, WatermarkOutcome, Watermarker};
