//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Field '{field}' contains the entry delimiter: {value}")]
    DelimiterInField { field: &'static str, value: String },

    #[error("Field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("Malformed queue entry: {0}")]
    MalformedEntry(String),

    #[error("Unknown entry format: {0}")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEntry(msg.into())
    }
}
