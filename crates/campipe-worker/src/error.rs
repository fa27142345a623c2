//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Queue error: {0}")]
    Queue(#[from] campipe_queue::QueueError),

    #[error("Media error: {0}")]
    Media(#[from] campipe_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Whether the worker can keep polling after this error.
    ///
    /// A malformed entry has already been dead-lettered; anything touching the
    /// queue service itself ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WorkerError::Queue(campipe_queue::QueueError::MalformedEntry { .. })
        )
    }
}
