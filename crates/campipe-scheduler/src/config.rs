//! Scheduler configuration.

use std::path::PathBuf;

/// Thresholds used to classify a block.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// A block needs strictly more matching videos than this to be scheduled.
    /// 60 are expected; two missing ones are tolerated.
    pub min_videos: usize,
    /// Frames expected once a block is fully extracted.
    pub expected_frames: usize,
    /// File written by pose estimation when a block is finished
    pub completion_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_videos: 58,
            expected_frames: 5800,
            completion_marker: "alphapose-result.json".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_videos: std::env::var("MIN_BLOCK_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_videos),
            expected_frames: std::env::var("BLOCK_FRAME_TARGET")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expected_frames),
            completion_marker: std::env::var("COMPLETION_MARKER")
                .unwrap_or(defaults.completion_marker),
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Root of the video archive
    pub video_root: PathBuf,
    /// Root of the extracted frame store
    pub frame_root: PathBuf,
    /// Classification thresholds
    pub classifier: ClassifierConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            video_root: PathBuf::from("/data/dahliasf"),
            frame_root: PathBuf::from("/data/dahliasf/frames"),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            video_root: std::env::var("VIDEO_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.video_root),
            frame_root: std::env::var("FRAME_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frame_root),
            classifier: ClassifierConfig::from_env(),
        }
    }
}
