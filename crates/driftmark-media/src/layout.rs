//! Non-overlapping watermark placement.
//!
//! Each watermark gets a normalized center point drawn uniformly inside
//! the frame's safe area. Candidates are rejected while their footprint
//! intersects an already placed watermark, up to [`MAX_PLACEMENT_ATTEMPTS`]
//! times; after that the last candidate is kept even though it overlaps.
//!
//! The list of occupied regions is threaded through the per-index step,
//! so the planner holds no mutable state of its own.

use tracing::{debug, warn};

use driftmark_models::{Placement, Region, VideoInfo, WatermarkConfig};

use crate::random::RandomSource;

/// Average glyph advance as a fraction of font size.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;
/// Line height as a fraction of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Extra distance kept from the frame edge, in pixels.
pub const EDGE_PADDING_PX: f64 = 20.0;
/// Upper bound for drift amplitude as a fraction of the shorter frame side.
pub const MAX_AMPLITUDE_FRACTION: f64 = 0.15;
/// Rejection sampling budget per watermark.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 50;
/// Characters added by the live clock suffix (" HH:MM:SS").
pub const CLOCK_SUFFIX_CHARS: usize = 9;

/// Estimated pixel size of the rendered text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFootprint {
    pub width: f64,
    pub height: f64,
}

impl TextFootprint {
    /// Estimate the size of `chars` glyphs at `font_size`.
    pub fn estimate(chars: usize, font_size: u32) -> Self {
        let font_size = f64::from(font_size);
        Self {
            width: font_size * chars as f64 * TEXT_WIDTH_FACTOR,
            height: font_size * LINE_HEIGHT_FACTOR,
        }
    }

    /// Footprint of the text a config will display.
    pub fn for_config(config: &WatermarkConfig) -> Self {
        let mut chars = config.text.chars().count();
        if config.include_time {
            chars += CLOCK_SUFFIX_CHARS;
        }
        Self::estimate(chars, config.font_size)
    }
}

/// Convert a pixel amplitude to a fraction of the shorter frame side, capped
/// at [`MAX_AMPLITUDE_FRACTION`].
pub fn amplitude_fraction(amplitude_px: f64, frame: &VideoInfo) -> f64 {
    let shorter = f64::from(frame.min_dimension().max(1));
    (amplitude_px / shorter).min(MAX_AMPLITUDE_FRACTION)
}

/// Result of placing one watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementOutcome {
    /// Found a spot clear of every earlier watermark.
    Clean {
        placement: Placement,
        region: Region,
        attempts: usize,
    },
    /// Attempt budget exhausted; the last candidate overlaps.
    WithOverlap { placement: Placement, region: Region },
}

impl PlacementOutcome {
    pub fn placement(&self) -> &Placement {
        match self {
            Self::Clean { placement, .. } | Self::WithOverlap { placement, .. } => placement,
        }
    }

    pub fn region(&self) -> &Region {
        match self {
            Self::Clean { region, .. } | Self::WithOverlap { region, .. } => region,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean { .. })
    }
}

/// Places watermarks for one frame size and text footprint.
#[derive(Debug, Clone)]
pub struct LayoutPlanner {
    footprint: TextFootprint,
    amplitude_px: f64,
    frame: VideoInfo,
    max_attempts: usize,
}

impl LayoutPlanner {
    /// Create a planner for a validated config and probed frame.
    pub fn new(config: &WatermarkConfig, frame: VideoInfo) -> Self {
        Self::with_footprint(TextFootprint::for_config(config), config.amplitude, frame)
    }

    pub fn with_footprint(footprint: TextFootprint, amplitude_px: f64, frame: VideoInfo) -> Self {
        Self {
            footprint,
            amplitude_px,
            frame,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    /// Override the attempt budget (at least one attempt is always made).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Drift amplitude as a capped fraction of the shorter frame side.
    pub fn amplitude_fraction(&self) -> f64 {
        amplitude_fraction(self.amplitude_px, &self.frame)
    }

    /// Normalized distance from each edge a center point must keep.
    pub fn safe_margins(&self) -> (f64, f64) {
        let width = f64::from(self.frame.width);
        let height = f64::from(self.frame.height);
        (
            (self.footprint.width + self.amplitude_px + EDGE_PADDING_PX) / width,
            (self.footprint.height + self.amplitude_px + EDGE_PADDING_PX) / height,
        )
    }

    /// Normalized size of the area a watermark reserves.
    pub fn region_size(&self) -> (f64, f64) {
        let padding = 2.0 * self.amplitude_px;
        (
            (self.footprint.width + padding) / f64::from(self.frame.width),
            (self.footprint.height + padding) / f64::from(self.frame.height),
        )
    }

    /// Place one watermark against the regions committed so far.
    pub fn place<R>(&self, index: usize, occupied: &[Region], rng: &mut R) -> PlacementOutcome
    where
        R: RandomSource + ?Sized,
    {
        let (margin_x, margin_y) = self.safe_margins();
        let (region_w, region_h) = self.region_size();

        let mut last = None;
        for attempt in 1..=self.max_attempts {
            let x = sample_axis(rng, margin_x);
            let y = sample_axis(rng, margin_y);
            let placement = Placement::new(index, x, y);
            let region = Region::centered(x, y, region_w, region_h);

            if !occupied.iter().any(|other| region.overlaps(other)) {
                debug!(index, attempt, x, y, "Placed watermark");
                return PlacementOutcome::Clean {
                    placement,
                    region,
                    attempts: attempt,
                };
            }
            last = Some((placement, region));
        }

        // max_attempts >= 1, so at least one candidate was drawn
        let (placement, region) = last.unwrap_or_else(|| {
            (Placement::new(index, 0.5, 0.5), Region::centered(0.5, 0.5, region_w, region_h))
        });
        warn!(
            index,
            attempts = self.max_attempts,
            x = placement.x,
            y = placement.y,
            "No free spot for watermark, accepting overlapping placement"
        );
        PlacementOutcome::WithOverlap { placement, region }
    }

    /// Place `count` watermarks in index order.
    pub fn plan<R>(&self, count: usize, rng: &mut R) -> Vec<PlacementOutcome>
    where
        R: RandomSource + ?Sized,
    {
        let (_occupied, outcomes) = (0..count).fold(
            (Vec::with_capacity(count), Vec::with_capacity(count)),
            |(mut occupied, mut outcomes): (Vec<Region>, Vec<PlacementOutcome>), index| {
                debug_assert_eq!(occupied.len(), index);
                let outcome = self.place(index, &occupied, &mut *rng);
                occupied.push(*outcome.region());
                outcomes.push(outcome);
                (occupied, outcomes)
            },
        );
        outcomes
    }
}

/// Uniform draw in `[margin, 1 - margin]`, or the center when the safe
/// interval is empty. Always consumes one draw.
fn sample_axis<R: RandomSource + ?Sized>(rng: &mut R, margin: f64) -> f64 {
    let unit = rng.next_unit();
    if margin >= 0.5 {
        0.5
    } else {
        margin + unit * (1.0 - 2.0 * margin)
    }
}
