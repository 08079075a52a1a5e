//! Output path derivation and directory preparation.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::MediaResult;

/// Suffix inserted between the input stem and its extension.
pub const OUTPUT_SUFFIX: &str = "_watermarked";

/// Output file for `input` inside `out_dir`: `<stem>_watermarked<.ext>`.
///
/// An input without an extension yields an output without one.
pub fn watermarked_output_path(input: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };

    out_dir.as_ref().join(file_name)
}

/// Create `dir` and any missing parents. An existing directory is fine.
pub async fn prepare_output_dir(dir: impl AsRef<Path>) -> MediaResult<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "Creating output directory");
    }
    fs::create_dir_all(dir).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_keeps_extension() {
        assert_eq!(
            watermarked_output_path("/videos/clip.mp4", "/out"),
            PathBuf::from("/out/clip_watermarked.mp4")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(
            watermarked_output_path("recording", "out"),
            PathBuf::from("out/recording_watermarked")
        );
    }

    #[test]
    fn test_output_path_multiple_dots() {
        assert_eq!(
            watermarked_output_path("a/show.s01e01.mkv", "b"),
            PathBuf::from("b/show.s01e01_watermarked.mkv")
        );
    }

    #[tokio::test]
    async fn test_prepare_output_dir_nested_and_existing() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b").join("c");

        prepare_output_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        // Second call on an existing directory succeeds
        prepare_output_dir(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_prepare_output_dir_over_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        std::fs::write(&file, b"x").unwrap();

        assert!(prepare_output_dir(&file).await.is_err());
    }
}
