//! Shared data models for the driftmark watermark pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Watermark task configuration and its validation
//! - Probed video information
//! - Normalized layout regions and placements
//! - Motion parameters
//! - Encoding configuration

pub mod encoding;
pub mod motion;
pub mod region;
pub mod timestamp;
pub mod video;
pub mod watermark;

// Re-export common types
pub use encoding::EncodingConfig;
pub use motion::{MotionKind, MotionParams};
pub use region::{Placement, Region};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use video::VideoInfo;
pub use watermark::{ConfigValidationError, ConfigViolation, WatermarkConfig};
