//! Scheduler error types.

use std::path::PathBuf;

use thiserror::Error;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid operating hours '{hours}': {reason}")]
    InvalidHours { hours: String, reason: String },

    #[error("Invalid reprocess date: {0}")]
    InvalidReprocessDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(String),

    #[error("Environment directory not found: {0}")]
    EnvironmentNotFound(PathBuf),

    #[error("Path is outside the video root: {0}")]
    OutsideVideoRoot(PathBuf),

    #[error("Queue error: {0}")]
    Queue(#[from] campipe_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    pub fn invalid_hours(hours: &str, reason: impl Into<String>) -> Self {
        Self::InvalidHours {
            hours: hours.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised while validating operator input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SchedulerError::InvalidHours { .. }
                | SchedulerError::InvalidReprocessDate(_)
                | SchedulerError::InvalidTimezone(_)
                | SchedulerError::NonexistentLocalTime(_)
        )
    }
}
