//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Malformed entry moved to dead letter queue: {raw}")]
    MalformedEntry {
        raw: String,
        #[source]
        source: campipe_models::ModelError,
    },

    #[error("Entry encoding failed: {0}")]
    Encoding(#[from] campipe_models::ModelError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }
}
