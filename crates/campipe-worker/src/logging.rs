//! Structured block logging utilities.

use std::path::Path;

use tracing::{error, info, warn, Span};

use campipe_models::QueueEntry;

/// Logger for one block's extraction, tagging every event with the worker
/// and the block's frame directory.
#[derive(Debug, Clone)]
pub struct BlockLogger {
    worker_id: String,
    block: String,
}

impl BlockLogger {
    pub fn new(worker_id: &str, entry: &QueueEntry) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            block: block_label(&entry.frames_dir),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            worker_id = %self.worker_id,
            block = %self.block,
            "Block started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            worker_id = %self.worker_id,
            block = %self.block,
            "Block progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            worker_id = %self.worker_id,
            block = %self.block,
            "Block warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            worker_id = %self.worker_id,
            block = %self.block,
            "Block error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            worker_id = %self.worker_id,
            block = %self.block,
            "Block completed: {}", message
        );
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    /// Span covering the block's extraction.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "block",
            worker_id = %self.worker_id,
            block = %self.block
        )
    }
}

/// Short label for a frame directory: the trailing
/// `{env}/{camera}/{YYYY}/{MM}/{DD}/{HH}/frames__{p}` components.
fn block_label(frames_dir: &Path) -> String {
    let components: Vec<_> = frames_dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let keep = components.len().min(7);
    components[components.len() - keep..].join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_label_keeps_archive_components() {
        let entry = QueueEntry::new(
            "/data/dahliasf/frames/room-a/cam/2024/03/06/07/frames__3",
            "/data/dahliasf/room-a/cam/2024/03/06/07",
            "3",
        );
        let logger = BlockLogger::new("worker-1", &entry);
        assert_eq!(logger.block(), "room-a/cam/2024/03/06/07/frames__3");
        assert_eq!(logger.worker_id(), "worker-1");
    }

    #[test]
    fn test_block_label_short_path() {
        let entry = QueueEntry::new("frames__3", "/hour", "3");
        assert_eq!(BlockLogger::new("w", &entry).block(), "frames__3");
    }
}
