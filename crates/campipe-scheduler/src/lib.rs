//! Block scheduling and dispatch.
//!
//! This crate provides:
//! - Operating-hours parsing and ten-minute block generation
//! - Camera directory discovery with a per-environment cache
//! - Block state classification from on-disk evidence
//! - The dispatcher that routes blocks to the work queues

pub mod camera;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod window;

pub use camera::CameraDirectoryCache;
pub use classifier::{BlockAssessment, BlockClassifier};
pub use config::{ClassifierConfig, SchedulerConfig};
pub use dispatcher::{DispatchPlan, DispatchSummary, Dispatcher, ScheduleOptions};
pub use error::{SchedulerError, SchedulerResult};
pub use window::{parse_range, parse_reprocess_date, parse_timezone, BlockPolicy, OperatingWindow};
