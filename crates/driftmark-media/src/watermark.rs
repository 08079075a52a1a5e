//! Moving text watermark pipeline.
//!
//! One run goes through these stages, in order:
//!
//! 1. Precondition: the input file exists ([`MediaError::FileNotFound`])
//! 2. Validation: every config violation is collected ([`MediaError::InvalidConfig`])
//! 3. Output directory creation
//! 4. Probe (never fails, degrades to 1920x1080 / 0s)
//! 5. Layout, motion and filter graph composition (pure given the random source)
//! 6. A single encoder invocation
//!
//! Nothing touches the filesystem before stage 3, so a rejected run leaves
//! no trace. A failed encode may leave a partial output file behind.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use driftmark_models::{EncodingConfig, MotionParams, VideoInfo, WatermarkConfig};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{DrawTextStanza, FilterGraphBuilder};
use crate::fs_utils::{prepare_output_dir, watermarked_output_path};
use crate::layout::{LayoutPlanner, PlacementOutcome};
use crate::motion::MotionSynthesizer;
use crate::probe::MetadataProbe;
use crate::progress::EncodeProgress;
use crate::random::{RandomSource, RngSource};
use crate::tools::ToolPaths;

/// Layout, motion and filter graph for one config and frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedGraph {
    /// One entry per watermark, in index order
    pub placements: Vec<PlacementOutcome>,
    /// Motion parameters drawn for each watermark, in index order
    pub motions: Vec<MotionParams>,
    /// The `-vf` value
    pub filter_graph: String,
}

/// Plan, animate and render every watermark of `config` on `video`.
///
/// All placements are drawn first, then motion parameters per watermark in
/// index order. `config` is assumed valid.
pub fn compose_filter_graph<R>(config: &WatermarkConfig, video: VideoInfo, rng: &mut R) -> ComposedGraph
where
    R: RandomSource + ?Sized,
{
    let planner = LayoutPlanner::new(config, video);
    let placements = planner.plan(config.count as usize, rng);

    let synthesizer =
        MotionSynthesizer::new(config.speed, planner.amplitude_fraction(), placements.len());

    let mut builder = FilterGraphBuilder::new();
    let mut motions = Vec::with_capacity(placements.len());
    for outcome in &placements {
        let (params, trajectory) = synthesizer.synthesize(outcome.placement(), rng);
        debug!(
            index = outcome.placement().index,
            kind = %params.kind,
            x = outcome.placement().x,
            y = outcome.placement().y,
            "Synthesized watermark motion"
        );
        builder.push(DrawTextStanza::new(config, &trajectory));
        motions.push(params);
    }

    ComposedGraph {
        placements,
        motions,
        filter_graph: builder.build(),
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    pub output_path: PathBuf,
    /// Probed (or fallback) frame metadata
    pub video: VideoInfo,
    pub placements: Vec<PlacementOutcome>,
    pub filter_graph: String,
}

impl WatermarkOutcome {
    /// Number of watermarks placed over an earlier one.
    pub fn overlapping(&self) -> usize {
        self.placements.iter().filter(|p| !p.is_clean()).count()
    }
}

/// Runs the full pipeline against external ffprobe/ffmpeg binaries.
#[derive(Debug, Clone)]
pub struct Watermarker {
    tools: ToolPaths,
    encoding: EncodingConfig,
}

impl Default for Watermarker {
    fn default() -> Self {
        Self::new(ToolPaths::default())
    }
}

impl Watermarker {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            encoding: EncodingConfig::default(),
        }
    }

    /// Watermark `input` into `out_dir` using an OS-seeded random source.
    pub async fn process<F>(
        &self,
        input: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
        config: &WatermarkConfig,
        on_progress: F,
    ) -> MediaResult<WatermarkOutcome>
    where
        F: FnMut(EncodeProgress) + Send + 'static,
    {
        let mut rng = RngSource::from_entropy();
        self.process_with_rng(input, out_dir, config, &mut rng, on_progress)
            .await
    }

    /// Watermark `input` into `out_dir`, drawing randomness from `rng`.
    pub async fn process_with_rng<R, F>(
        &self,
        input: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
        config: &WatermarkConfig,
        rng: &mut R,
        mut on_progress: F,
    ) -> MediaResult<WatermarkOutcome>
    where
        R: RandomSource + ?Sized,
        F: FnMut(EncodeProgress) + Send + 'static,
    {
        let input = input.as_ref();
        let out_dir = out_dir.as_ref();

        if !input.is_file() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        config.validate()?;

        prepare_output_dir(out_dir).await?;
        let output_path = watermarked_output_path(input, out_dir);

        info!(
            input = %input.display(),
            output = %output_path.display(),
            count = config.count,
            "Applying moving watermark"
        );

        let video = MetadataProbe::new(&self.tools.ffprobe).probe(input).await;
        let composed = compose_filter_graph(config, video, rng);

        let cmd = FfmpegCommand::new(input, &output_path)
            .video_filter(&composed.filter_graph)
            .encoding(&self.encoding);

        let total_secs = video.duration;
        let mut last_percent: Option<u32> = None;
        let report = move |progress: EncodeProgress| {
            if total_secs > 0.0 {
                let percent = progress.percentage(total_secs).floor() as u32;
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    info!(
                        percent,
                        out_time = %progress.out_time,
                        speed = progress.speed,
                        eta_secs = ?progress.eta_seconds(total_secs),
                        "Encoding progress"
                    );
                }
            } else {
                debug!(out_time = %progress.out_time, "Encoding progress");
            }
            on_progress(progress);
        };

        FfmpegRunner::new(&self.tools.ffmpeg)
            .run_with_progress(&cmd, report)
            .await?;

        info!(output = %output_path.display(), "Watermark applied successfully");

        Ok(WatermarkOutcome {
            output_path,
            video,
            placements: composed.placements,
            filter_graph: composed.filter_graph,
        })
    }
}
