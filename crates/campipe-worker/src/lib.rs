//! Frame extraction worker.
//!
//! This crate provides:
//! - The consume-and-extract loop over the frames queue
//! - Dead-lettering of blocks whose extraction failed
//! - Structured per-block logging
//! - Graceful shutdown between blocks

pub mod config;
pub mod error;
pub mod logging;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::BlockLogger;
pub use worker::{BlockReport, ExtractionWorker, PollOutcome};
