//! Closed-form drift trajectories.
//!
//! Each axis position is a center point plus a primary harmonic and a
//! weaker, faster secondary harmonic:
//!
//! ```text
//! pos(t) = D*center - extent/2
//!        + D*A*mult*dir * trig(speed*t + phase_offset + seed)
//!        + D*A*mult*weight * trig(speed*ratio*t + seed)
//! ```
//!
//! where `D` is the frame dimension (`w` or `h`) and `A` the capped
//! amplitude fraction. The secondary term keeps the motion from looking
//! perfectly periodic. Trajectories are plain values; [`AxisTrajectory::render`]
//! turns them into FFmpeg expression text.

use std::f64::consts::TAU;

use driftmark_models::{MotionKind, MotionParams, Placement};

use crate::random::RandomSource;

/// Speed multipliers are drawn from this range.
pub const SPEED_MULTIPLIER_RANGE: (f64, f64) = (0.3, 0.7);
/// Amplitude multipliers are drawn from this range.
pub const AMPLITUDE_MULTIPLIER_RANGE: (f64, f64) = (0.8, 1.2);

/// Trigonometric function of a harmonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sin,
    Cos,
}

impl Wave {
    fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
        }
    }

    fn apply(self, angle: f64) -> f64 {
        match self {
            Self::Sin => angle.sin(),
            Self::Cos => angle.cos(),
        }
    }
}

/// One `amplitude * wave(speed*t + phase)` term; amplitude is a signed
/// fraction of the frame dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    pub amplitude: f64,
    pub speed: f64,
    pub phase: f64,
    pub wave: Wave,
}

impl Harmonic {
    fn value_at(&self, t: f64) -> f64 {
        self.amplitude * self.wave.apply(self.speed * t + self.phase)
    }

    fn render(&self, dimension: &str) -> String {
        let sign = if self.amplitude < 0.0 { '-' } else { '+' };
        format!(
            "{sign}{dimension}*{:.4}*{}({:.4}*t+{:.4})",
            self.amplitude.abs(),
            self.wave.name(),
            self.speed,
            self.phase
        )
    }
}

/// Motion along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTrajectory {
    /// Normalized center of the text on this axis
    pub center: f64,
    pub primary: Harmonic,
    pub secondary: Harmonic,
}

impl AxisTrajectory {
    /// Normalized text-center position at playback time `t`.
    pub fn position_at(&self, t: f64) -> f64 {
        self.center + self.primary.value_at(t) + self.secondary.value_at(t)
    }

    /// Largest normalized distance from the center this axis can reach.
    pub fn max_displacement(&self) -> f64 {
        self.primary.amplitude.abs() + self.secondary.amplitude.abs()
    }

    /// Render as an FFmpeg expression positioning the text's top-left
    /// corner, e.g. `w*0.5000-text_w/2+w*0.0800*sin(...)...`.
    pub fn render(&self, dimension: &str, extent: &str) -> String {
        format!(
            "{dimension}*{:.4}-{extent}/2{}{}",
            self.center,
            self.primary.render(dimension),
            self.secondary.render(dimension)
        )
    }
}

/// Motion of one watermark on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub x: AxisTrajectory,
    pub y: AxisTrajectory,
}

impl Trajectory {
    /// drawtext `x` expression.
    pub fn x_expr(&self) -> String {
        self.x.render("w", "text_w")
    }

    /// drawtext `y` expression.
    pub fn y_expr(&self) -> String {
        self.y.render("h", "text_h")
    }
}

/// Shape of one axis for a motion kind.
#[derive(Debug, Clone, Copy)]
struct AxisShape {
    wave: Wave,
    /// Primary amplitude relative to the base amplitude
    weight: f64,
    /// Secondary speed relative to the primary speed
    secondary_ratio: f64,
    /// Secondary amplitude relative to the primary amplitude
    secondary_weight: f64,
}

const DOMINANT: AxisShape = AxisShape {
    wave: Wave::Sin,
    weight: 1.0,
    secondary_ratio: 1.7,
    secondary_weight: 0.3,
};

const RESIDUAL: AxisShape = AxisShape {
    wave: Wave::Sin,
    weight: 0.25,
    secondary_ratio: 2.1,
    secondary_weight: 0.1,
};

const ELLIPSE_X: AxisShape = AxisShape {
    wave: Wave::Sin,
    weight: 1.0,
    secondary_ratio: 1.4,
    secondary_weight: 0.4,
};

const ELLIPSE_Y: AxisShape = AxisShape {
    wave: Wave::Cos,
    weight: 0.9,
    secondary_ratio: 1.6,
    secondary_weight: 0.2,
};

fn axis_shapes(kind: MotionKind) -> (AxisShape, AxisShape) {
    match kind {
        MotionKind::HorizontalDominant => (DOMINANT, RESIDUAL),
        MotionKind::VerticalDominant => (RESIDUAL, DOMINANT),
        MotionKind::Elliptical => (ELLIPSE_X, ELLIPSE_Y),
    }
}

/// Derives motion parameters and trajectories for one run.
#[derive(Debug, Clone, Copy)]
pub struct MotionSynthesizer {
    speed: f64,
    amplitude_fraction: f64,
    count: usize,
}

impl MotionSynthesizer {
    /// `amplitude_fraction` is the already capped amplitude (see
    /// [`crate::layout::amplitude_fraction`]).
    pub fn new(speed: f64, amplitude_fraction: f64, count: usize) -> Self {
        Self {
            speed,
            amplitude_fraction,
            count: count.max(1),
        }
    }

    /// Deterministic phase spread for a watermark index.
    pub fn phase_offset(&self, index: usize) -> f64 {
        index as f64 * TAU / self.count as f64
    }

    /// Draw fresh parameters for one watermark.
    ///
    /// Draw order: seed x, seed y, sign x, sign y, speed x, speed y,
    /// amplitude x, amplitude y, motion kind.
    pub fn sample_params<R>(&self, index: usize, rng: &mut R) -> MotionParams
    where
        R: RandomSource + ?Sized,
    {
        let (speed_low, speed_high) = SPEED_MULTIPLIER_RANGE;
        let (amp_low, amp_high) = AMPLITUDE_MULTIPLIER_RANGE;

        let seed_x = rng.uniform(0.0, TAU);
        let seed_y = rng.uniform(0.0, TAU);
        let direction_x = rng.sign();
        let direction_y = rng.sign();
        let speed_x = rng.uniform(speed_low, speed_high);
        let speed_y = rng.uniform(speed_low, speed_high);
        let amplitude_x = rng.uniform(amp_low, amp_high);
        let amplitude_y = rng.uniform(amp_low, amp_high);
        let kind = MotionKind::from_unit(rng.next_unit());

        MotionParams {
            phase_offset: self.phase_offset(index),
            seed_x,
            seed_y,
            direction_x,
            direction_y,
            speed_x,
            speed_y,
            amplitude_x,
            amplitude_y,
            kind,
        }
    }

    /// Build the trajectory for a placement. Pure: identical inputs give
    /// identical output.
    pub fn trajectory(&self, placement: &Placement, params: &MotionParams) -> Trajectory {
        let (shape_x, shape_y) = axis_shapes(params.kind);
        Trajectory {
            x: self.axis(
                placement.x,
                shape_x,
                params.amplitude_x,
                params.direction_x,
                params.speed_x,
                params.phase_offset,
                params.seed_x,
            ),
            y: self.axis(
                placement.y,
                shape_y,
                params.amplitude_y,
                params.direction_y,
                params.speed_y,
                params.phase_offset,
                params.seed_y,
            ),
        }
    }

    /// Sample parameters and build the trajectory in one step.
    pub fn synthesize<R>(&self, placement: &Placement, rng: &mut R) -> (MotionParams, Trajectory)
    where
        R: RandomSource + ?Sized,
    {
        let params = self.sample_params(placement.index, rng);
        let trajectory = self.trajectory(placement, &params);
        (params, trajectory)
    }

    #[allow(clippy::too_many_arguments)]
    fn axis(
        &self,
        center: f64,
        shape: AxisShape,
        amplitude_multiplier: f64,
        direction: f64,
        speed_multiplier: f64,
        phase_offset: f64,
        seed: f64,
    ) -> AxisTrajectory {
        let primary = self.amplitude_fraction * shape.weight * amplitude_multiplier;
        let speed = self.speed * speed_multiplier;

        AxisTrajectory {
            center,
            primary: Harmonic {
                amplitude: primary * direction,
                speed,
                phase: phase_offset + seed,
                wave: shape.wave,
            },
            secondary: Harmonic {
                amplitude: primary * shape.secondary_weight,
                speed: speed * shape.secondary_ratio,
                phase: seed,
                wave: shape.wave,
            },
        }
    }
}
