//! Typed work queues over a set store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use campipe_models::{EntryFormat, QueueEntry, QueueKind};

use crate::error::{QueueError, QueueResult};
use crate::redis_store::RedisSetStore;
use crate::store::SetStore;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Set holding blocks that need frame extraction
    pub frames_key: String,
    /// Set holding blocks that need pose estimation
    pub poses_key: String,
    /// Set holding blocks whose extraction failed
    pub dead_frames_key: String,
    /// Encoding used for new entries
    pub entry_format: EntryFormat,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            frames_key: "frame_dirs".to_string(),
            poses_key: "pose_dirs".to_string(),
            dead_frames_key: "error_dirs".to_string(),
            entry_format: EntryFormat::Delimited,
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            frames_key: std::env::var("FRAMES_QUEUE_KEY").unwrap_or(defaults.frames_key),
            poses_key: std::env::var("POSES_QUEUE_KEY").unwrap_or(defaults.poses_key),
            dead_frames_key: std::env::var("DEAD_FRAMES_QUEUE_KEY")
                .unwrap_or(defaults.dead_frames_key),
            entry_format: std::env::var("QUEUE_ENTRY_FORMAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.entry_format),
        }
    }

    /// Set key backing `kind`.
    pub fn key(&self, kind: QueueKind) -> &str {
        match kind {
            QueueKind::Frames => &self.frames_key,
            QueueKind::Poses => &self.poses_key,
            QueueKind::DeadFrames => &self.dead_frames_key,
        }
    }
}

/// Work queue client.
///
/// Membership is idempotent, so re-running the dispatcher over blocks that
/// are already queued leaves the queues unchanged.
#[derive(Clone)]
pub struct WorkQueueClient {
    store: Arc<dyn SetStore>,
    config: QueueConfig,
}

impl WorkQueueClient {
    pub fn new(store: Arc<dyn SetStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Create a Redis-backed client from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        let config = QueueConfig::from_env();
        let store = RedisSetStore::new(&config.redis_url)?;
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Add `entry` to `kind`. Returns `true` if it was not already queued.
    pub async fn enqueue(&self, kind: QueueKind, entry: &QueueEntry) -> QueueResult<bool> {
        let payload = entry.encode(self.config.entry_format)?;
        let added = self.store.add(self.config.key(kind), &payload).await?;
        if added {
            debug!(queue = %kind, entry = %entry, "Enqueued block");
        } else {
            debug!(queue = %kind, entry = %entry, "Block already queued");
        }
        Ok(added)
    }

    /// Pop one arbitrary entry from `kind`, or `None` if the queue is empty.
    ///
    /// A member that does not decode is moved verbatim to the dead letter
    /// queue and reported as [`QueueError::MalformedEntry`].
    pub async fn dequeue(&self, kind: QueueKind) -> QueueResult<Option<QueueEntry>> {
        let Some(raw) = self.store.pop(self.config.key(kind)).await? else {
            return Ok(None);
        };

        match QueueEntry::decode(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(source) => {
                warn!(queue = %kind, raw = %raw, "Failed to parse queue entry: {}", source);
                self.store.add(self.config.key(QueueKind::DeadFrames), &raw).await?;
                Err(QueueError::MalformedEntry { raw, source })
            }
        }
    }

    /// Record a failed block in the dead letter queue.
    pub async fn dead_letter(&self, entry: &QueueEntry) -> QueueResult<bool> {
        let added = self.enqueue(QueueKind::DeadFrames, entry).await?;
        warn!(entry = %entry, "Moved block to dead letter queue");
        Ok(added)
    }

    /// Number of entries in `kind`. Diagnostic only.
    pub async fn size(&self, kind: QueueKind) -> QueueResult<u64> {
        self.store.cardinality(self.config.key(kind)).await
    }

    /// Log the size of every queue.
    pub async fn log_sizes(&self) -> QueueResult<()> {
        let frames = self.size(QueueKind::Frames).await?;
        let poses = self.size(QueueKind::Poses).await?;
        let dead = self.size(QueueKind::DeadFrames).await?;
        info!(frames, poses, dead, "Current queue lengths");
        Ok(())
    }
}
