//! Block processing states and destination queues.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The queues a block can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// Blocks whose frames still need extracting.
    Frames,
    /// Blocks with extracted frames awaiting pose estimation.
    Poses,
    /// Blocks whose extraction failed.
    DeadFrames,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Frames => write!(f, "frames"),
            QueueKind::Poses => write!(f, "poses"),
            QueueKind::DeadFrames => write!(f, "dead_frames"),
        }
    }
}

/// Processing state of a block, always derived from on-disk evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    /// Enough source video, frames not (fully) extracted.
    NeedsExtraction,
    /// Frames extracted, pose estimation not finished.
    NeedsPoseEstimation,
    /// Completion marker present.
    Complete,
}

impl BlockState {
    /// Queue this state is dispatched to, if any.
    pub fn queue(&self) -> Option<QueueKind> {
        match self {
            BlockState::NeedsExtraction => Some(QueueKind::Frames),
            BlockState::NeedsPoseEstimation => Some(QueueKind::Poses),
            BlockState::Complete => None,
        }
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockState::NeedsExtraction => write!(f, "needs_extraction"),
            BlockState::NeedsPoseEstimation => write!(f, "needs_pose_estimation"),
            BlockState::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_queue_mapping() {
        assert_eq!(BlockState::NeedsExtraction.queue(), Some(QueueKind::Frames));
        assert_eq!(BlockState::NeedsPoseEstimation.queue(), Some(QueueKind::Poses));
        assert_eq!(BlockState::Complete.queue(), None);
    }
}
