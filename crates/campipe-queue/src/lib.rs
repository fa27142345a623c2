//! Redis set-backed work queues.
//!
//! This crate provides:
//! - A minimal set-store seam (add member, pop arbitrary member, cardinality)
//! - A Redis implementation and an in-memory one
//! - A typed client that enqueues, dequeues and dead-letters block entries

pub mod error;
pub mod memory;
pub mod queue;
pub mod redis_store;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use memory::MemorySetStore;
pub use queue::{QueueConfig, WorkQueueClient};
pub use redis_store::RedisSetStore;
pub use store::SetStore;
