//! driftmark binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, Instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use driftmark_cli::{exit_code_for, resolve_config, CliConfig, CliError, RunLogger, WatermarkArgs};
use driftmark_media::{watermarked_output_path, RngSource, Watermarker};
use driftmark_models::{format_seconds, WatermarkConfig};

const DEFAULT_LOG_DIRECTIVE: &str = "driftmark=info";

#[derive(Parser)]
#[command(name = "driftmark")]
#[command(about = "Burn drifting text watermarks into videos", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watermark a video
    Run {
        /// Input video file
        input: PathBuf,
        /// Output directory (defaults to DRIFTMARK_OUTPUT_DIR or ./output)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// JSON task file; flags override its keys
        #[arg(long)]
        task: Option<PathBuf>,
        /// Seed the layout and motion generator for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Verify that ffmpeg and ffprobe can be found
    Check,

    /// Print the JSON schema of the task file
    Schema,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();
    let config = CliConfig::from_env();

    init_tracing(config.log_json);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output_dir,
            task,
            seed,
            watermark,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            cmd_run(&config, input, output_dir, task, seed, watermark).await
        }
        Commands::Check => cmd_check(&config),
        Commands::Schema => cmd_schema(),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(exit_code_for(&e));
    }
}

/// Colored output for dev, JSON for production.
fn init_tracing(use_json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn cmd_run(
    config: &CliConfig,
    input: PathBuf,
    output_dir: PathBuf,
    task: Option<PathBuf>,
    seed: Option<u64>,
    args: WatermarkArgs,
) -> Result<()> {
    let logger = RunLogger::new(&input);
    let span = logger.create_span();

    run_job(config, &logger, input, output_dir, task, seed, args)
        .instrument(span)
        .await
}

async fn run_job(
    config: &CliConfig,
    logger: &RunLogger,
    input: PathBuf,
    output_dir: PathBuf,
    task: Option<PathBuf>,
    seed: Option<u64>,
    args: WatermarkArgs,
) -> Result<()> {
    let watermark = resolve_config(task.as_deref(), &args)?;
    logger.log_start(&format!(
        "{} watermark(s) into {}",
        watermark.count,
        output_dir.display()
    ));

    let watermarker = Watermarker::new(config.tool_paths());
    let result = match seed {
        Some(seed) => {
            info!(seed, "Using seeded layout generator");
            let mut rng = RngSource::seeded(seed);
            watermarker
                .process_with_rng(&input, &output_dir, &watermark, &mut rng, |_| {})
                .await
        }
        None => watermarker.process(&input, &output_dir, &watermark, |_| {}).await,
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            logger.log_failure(&e);
            if !e.is_preflight() {
                logger.log_warning(&format!(
                    "{} may be incomplete",
                    watermarked_output_path(&input, &output_dir).display()
                ));
            }
            return Err(CliError::from(e).into());
        }
    };

    let overlapping = outcome.overlapping();
    if overlapping > 0 {
        logger.log_warning(&format!(
            "{} of {} watermarks overlap an earlier one",
            overlapping,
            outcome.placements.len()
        ));
    }

    logger.log_completion(&format!(
        "{} ({}x{}, {})",
        outcome.output_path.display(),
        outcome.video.width,
        outcome.video.height,
        format_seconds(outcome.video.duration)
    ));
    println!("{}", outcome.output_path.display());
    Ok(())
}

fn cmd_check(config: &CliConfig) -> Result<()> {
    let tools = config.tool_paths();
    tools.check()?;

    println!("ffmpeg: {}", tools.ffmpeg.display());
    println!("ffprobe: {}", tools.ffprobe.display());
    Ok(())
}

fn cmd_schema() -> Result<()> {
    let schema = schemars::schema_for!(WatermarkConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
