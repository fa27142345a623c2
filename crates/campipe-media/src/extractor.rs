//! Frame extraction seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Characters of the source file name used as the frame file prefix.
pub const FRAME_PREFIX_LEN: usize = 5;

/// Extracts numbered frames from one source video.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Write the frames of `input` to files matching `output_pattern`.
    async fn extract(&self, input: &Path, output_pattern: &Path) -> MediaResult<()>;
}

/// Output pattern for the frames of `source` inside `frames_dir`:
/// `{frames_dir}/{first 5 chars of the file name}_%03d.png`.
pub fn frame_pattern(frames_dir: &Path, source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix: String = name.chars().take(FRAME_PREFIX_LEN).collect();
    frames_dir.join(format!("{prefix}_%03d.png"))
}

/// [`FrameExtractor`] that shells out to FFmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameExtractor {
    runner: FfmpegRunner,
}

impl FfmpegFrameExtractor {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract(&self, input: &Path, output_pattern: &Path) -> MediaResult<()> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        info!(input = %input.display(), "Extracting frames");
        let cmd = FfmpegCommand::new(input, output_pattern);
        self.runner.run(&cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pattern_uses_first_five_chars() {
        let pattern = frame_pattern(
            Path::new("/frames/frames__3"),
            Path::new("/video/07/31_00_000.mp4"),
        );
        assert_eq!(pattern, PathBuf::from("/frames/frames__3/31_00_%03d.png"));
    }

    #[test]
    fn test_frame_pattern_short_name() {
        let pattern = frame_pattern(Path::new("/frames"), Path::new("/video/3.ts"));
        assert_eq!(pattern, PathBuf::from("/frames/3.ts_%03d.png"));
    }

    #[tokio::test]
    async fn test_missing_input_is_not_run() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FfmpegFrameExtractor::default();
        let err = extractor
            .extract(&dir.path().join("missing.mp4"), &dir.path().join("x_%03d.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
