//! Block state classification from on-disk evidence.
//!
//! The filesystem is the only record of a block's progress: source video
//! counts in the archive hour directory, extracted frame counts in the frame
//! store, and the completion marker left by pose estimation. Every call
//! re-reads them.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use campipe_models::{BlockState, CameraPath, QueueEntry, TimeBlock};

use crate::config::{ClassifierConfig, SchedulerConfig};
use crate::error::{SchedulerError, SchedulerResult};

/// Classification of one camera's block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAssessment {
    pub state: BlockState,
    /// Matching source videos in the hour directory.
    pub video_count: usize,
    /// Extracted frames, `None` when the completion marker short-circuited
    /// the count.
    pub frame_count: Option<usize>,
    pub entry: QueueEntry,
}

/// Classifies blocks against the video archive and frame store.
#[derive(Debug, Clone)]
pub struct BlockClassifier {
    video_root: PathBuf,
    frame_root: PathBuf,
    config: ClassifierConfig,
}

impl BlockClassifier {
    pub fn new(
        video_root: impl Into<PathBuf>,
        frame_root: impl Into<PathBuf>,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            video_root: video_root.into(),
            frame_root: frame_root.into(),
            config,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(&config.video_root, &config.frame_root, config.classifier.clone())
    }

    /// Assess `block` for every camera. Cameras without enough source video
    /// produce no assessment.
    pub async fn classify(
        &self,
        cameras: &[CameraPath],
        block: &TimeBlock,
    ) -> SchedulerResult<Vec<BlockAssessment>> {
        let mut assessments = Vec::new();
        for camera in cameras {
            if let Some(assessment) = self.assess(camera, block).await? {
                assessments.push(assessment);
            }
        }
        Ok(assessments)
    }

    /// Assess one camera's block, or `None` if too few source videos exist.
    pub async fn assess(
        &self,
        camera: &CameraPath,
        block: &TimeBlock,
    ) -> SchedulerResult<Option<BlockAssessment>> {
        let hour_dir = camera.hour_dir(block);
        let prefix = block.minute_prefix();

        let video_count = count_files(&hour_dir, |name| name.starts_with(&prefix)).await?;
        if video_count <= self.config.min_videos {
            debug!(
                hour_dir = %hour_dir.display(),
                prefix = %prefix,
                video_count,
                "Not enough source video, skipping"
            );
            return Ok(None);
        }

        let frames_dir = self.frames_dir(&hour_dir, &prefix)?;
        let marker = frames_dir.join(&self.config.completion_marker);

        let (state, frame_count) = if fs::try_exists(&marker).await? {
            (BlockState::Complete, None)
        } else {
            let frames = count_files(&frames_dir, |_| true).await?;
            (self.state_for_frames(frames), Some(frames))
        };

        debug!(
            frames_dir = %frames_dir.display(),
            video_count,
            frame_count = ?frame_count,
            state = %state,
            "Classified block"
        );

        Ok(Some(BlockAssessment {
            state,
            video_count,
            frame_count,
            entry: QueueEntry::new(frames_dir, hour_dir, prefix),
        }))
    }

    /// State of a block without a completion marker holding `frames` frames.
    pub fn state_for_frames(&self, frames: usize) -> BlockState {
        if frames < self.config.expected_frames {
            BlockState::NeedsExtraction
        } else {
            BlockState::NeedsPoseEstimation
        }
    }

    /// Frame directory mirroring `hour_dir` under the frame root:
    /// `{frame_root}/{hour_dir relative to video_root}/frames__{prefix}`.
    pub fn frames_dir(&self, hour_dir: &Path, prefix: &str) -> SchedulerResult<PathBuf> {
        let relative = hour_dir
            .strip_prefix(&self.video_root)
            .map_err(|_| SchedulerError::OutsideVideoRoot(hour_dir.to_path_buf()))?;
        Ok(self.frame_root.join(relative).join(format!("frames__{prefix}")))
    }
}

/// Count regular files in `dir` whose names satisfy `keep`. A missing
/// directory counts as empty.
async fn count_files(dir: &Path, keep: impl Fn(&str) -> bool) -> SchedulerResult<usize> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if keep(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}
