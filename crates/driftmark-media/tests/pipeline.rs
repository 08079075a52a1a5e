//! End-to-end pipeline tests against scripted ffprobe/ffmpeg stand-ins.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serial_test::serial;
use tempfile::TempDir;

use driftmark_media::{MediaError, MetadataProbe, RngSource, ToolPaths, Watermarker};
use driftmark_models::{VideoInfo, WatermarkConfig};

const PROBE_JSON: &str = r#"{"streams":[{"width":1280,"height":720,"duration":"4.000000"}]}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn ffprobe(&self) -> PathBuf {
        self.script("ffprobe", &format!("echo '{PROBE_JSON}'\n"))
    }

    /// Records its argv one per line, reports two progress updates and
    /// touches the output file.
    fn ffmpeg_ok(&self) -> PathBuf {
        let args_file = self.args_file();
        self.script(
            "ffmpeg",
            &format!(
                "for a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'\n\
                 printf 'frame=1 time=00:00:01.00 speed=1.0x\\r' >&2\n\
                 printf 'frame=2 time=00:00:02.00 speed=1.0x\\r' >&2\n\
                 for last; do :; done\n\
                 : > \"$last\"\n\
                 exit 0\n",
                args_file.display()
            ),
        )
    }

    fn ffmpeg_failing(&self) -> PathBuf {
        let args_file = self.args_file();
        self.script(
            "ffmpeg",
            &format!(
                "for a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'\n\
                 echo '[libx264 @ 0x1] Error setting preset' >&2\n\
                 echo 'Conversion failed!' >&2\n\
                 exit 1\n",
                args_file.display()
            ),
        )
    }

    fn args_file(&self) -> PathBuf {
        self.path("ffmpeg-args.txt")
    }

    fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.args_file())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn input(&self) -> PathBuf {
        let input = self.path("clip.mp4");
        std::fs::write(&input, b"fake media").unwrap();
        input
    }
}

fn sample_config() -> WatermarkConfig {
    WatermarkConfig::new("SAMPLE")
        .with_font_size(40)
        .with_color("#FFFFFF")
        .with_opacity(0.8)
        .with_count(1)
        .with_speed(2.0)
        .with_amplitude(60.0)
        .with_include_time(false)
}

fn vf_value(args: &[String]) -> &str {
    let pos = args.iter().position(|a| a == "-vf").unwrap();
    &args[pos + 1]
}

fn watermarker(ffmpeg: &Path, ffprobe: &Path) -> Watermarker {
    Watermarker::new(ToolPaths::new(ffmpeg, ffprobe))
}

// Scripts are written then executed; serial runs keep another test's fork
// from holding a script open for writing (ETXTBSY).
#[tokio::test]
#[serial]
async fn test_clip_end_to_end() {
    let fx = Fixture::new();
    let input = fx.input();
    let out_dir = fx.path("out");
    let wm = watermarker(&fx.ffmpeg_ok(), &fx.ffprobe());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let outcome = wm
        .process_with_rng(
            &input,
            &out_dir,
            &sample_config(),
            &mut RngSource::seeded(42),
            move |p| sink.lock().unwrap().push(p.out_time_secs),
        )
        .await
        .unwrap();

    assert_eq!(outcome.output_path, out_dir.join("clip_watermarked.mp4"));
    assert!(outcome.output_path.exists());
    assert_eq!(outcome.video, VideoInfo::new(1280, 720, 4.0));
    assert_eq!(outcome.placements.len(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![1.0, 2.0]);

    let args = fx.recorded_args();
    assert_eq!(&args[..5], ["-y", "-hide_banner", "-loglevel", "error", "-stats"]);
    assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
    assert!(args.windows(2).any(|w| w == ["-preset", "medium"]));
    assert!(args.windows(2).any(|w| w == ["-crf", "23"]));
    assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
    assert_eq!(args.last().map(PathBuf::from), Some(outcome.output_path.clone()));

    let vf = vf_value(&args);
    assert_eq!(vf, outcome.filter_graph);
    assert_eq!(vf.matches("drawtext=").count(), 1);
    assert!(vf.contains("text=SAMPLE:fontsize=40:fontcolor=#FFFFFF:alpha=0.80"));
}

#[tokio::test]
#[serial]
async fn test_multiple_watermarks_share_one_filter_argument() {
    let fx = Fixture::new();
    let input = fx.input();
    let wm = watermarker(&fx.ffmpeg_ok(), &fx.ffprobe());

    let outcome = wm
        .process_with_rng(
            &input,
            fx.path("out"),
            &sample_config().with_count(3),
            &mut RngSource::seeded(7),
            |_| {},
        )
        .await
        .unwrap();

    let args = fx.recorded_args();
    assert_eq!(args.iter().filter(|a| *a == "-vf").count(), 1);
    assert_eq!(vf_value(&args).matches("drawtext=").count(), 3);
    assert_eq!(outcome.placements.len(), 3);
}

#[tokio::test]
#[serial]
async fn test_encoder_failure_carries_stderr() {
    let fx = Fixture::new();
    let input = fx.input();
    let wm = watermarker(&fx.ffmpeg_failing(), &fx.ffprobe());

    let err = wm
        .process(&input, fx.path("out"), &sample_config(), |_| {})
        .await
        .unwrap_err();

    match &err {
        MediaError::FfmpegFailed { exit_code, .. } => assert_eq!(*exit_code, Some(1)),
        other => panic!("expected FfmpegFailed, got {other:?}"),
    }
    let stderr = err.stderr().unwrap();
    assert!(stderr.contains("Error setting preset"));
    assert!(stderr.contains("Conversion failed!"));
}

#[tokio::test]
#[serial]
async fn test_missing_prober_uses_fallback_frame() {
    let fx = Fixture::new();
    let input = fx.input();
    let wm = watermarker(&fx.ffmpeg_ok(), &fx.path("no-such-ffprobe"));

    let outcome = wm
        .process(&input, fx.path("out"), &sample_config(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.video, VideoInfo::fallback());
    assert!(outcome.output_path.exists());
}

#[tokio::test]
#[serial]
async fn test_failing_prober_uses_fallback_frame() {
    let fx = Fixture::new();
    let input = fx.input();
    let ffprobe = fx.script(
        "ffprobe",
        "echo 'clip.mp4: Invalid data found when processing input' >&2\nexit 1\n",
    );

    assert_eq!(MetadataProbe::new(&ffprobe).probe(&input).await, VideoInfo::fallback());

    let outcome = watermarker(&fx.ffmpeg_ok(), &ffprobe)
        .process(&input, fx.path("out"), &sample_config(), |_| {})
        .await
        .unwrap();
    assert_eq!(outcome.video, VideoInfo::fallback());
}

#[tokio::test]
#[serial]
async fn test_prober_without_streams_uses_fallback_frame() {
    let fx = Fixture::new();
    let input = fx.input();
    let ffprobe = fx.script("ffprobe", "echo '{\"streams\":[]}'\n");

    assert_eq!(MetadataProbe::new(&ffprobe).probe(&input).await, VideoInfo::fallback());
}

#[tokio::test]
#[serial]
async fn test_invalid_config_never_invokes_encoder() {
    let fx = Fixture::new();
    let input = fx.input();
    let wm = watermarker(&fx.ffmpeg_ok(), &fx.ffprobe());

    let config = sample_config().with_font_size(200).with_count(20);
    let err = wm
        .process(&input, fx.path("out"), &config, |_| {})
        .await
        .unwrap_err();

    match err {
        MediaError::InvalidConfig(e) => assert_eq!(e.fields(), vec!["fontSize", "count"]),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    assert!(!fx.args_file().exists());
    assert!(!fx.path("out").exists());
}

#[tokio::test]
#[serial]
async fn test_missing_input_never_invokes_encoder() {
    let fx = Fixture::new();
    let wm = watermarker(&fx.ffmpeg_ok(), &fx.ffprobe());

    let err = wm
        .process(fx.path("absent.mp4"), fx.path("out"), &sample_config(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::FileNotFound(_)));
    assert!(!fx.args_file().exists());
}
