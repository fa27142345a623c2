//! Shared data models for the campipe block scheduler.
//!
//! This crate provides:
//! - Ten-minute time blocks and their directory naming
//! - Camera archive paths
//! - Block processing states and the queues they map to
//! - Queue entries and their wire encodings

pub mod block;
pub mod camera;
pub mod entry;
pub mod error;
pub mod state;

pub use block::{TimeBlock, BLOCK_MINUTES};
pub use camera::{CameraPath, CAMERA_ID_LEN};
pub use entry::{EntryFormat, QueueEntry, ENTRY_DELIMITER};
pub use error::{ModelError, ModelResult};
pub use state::{BlockState, QueueKind};
