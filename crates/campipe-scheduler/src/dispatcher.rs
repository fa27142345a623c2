//! Block dispatch.
//!
//! A run resolves which blocks to check, classifies every camera's block
//! and routes each actionable block to its queue. Nothing is remembered
//! between runs; queue set semantics make repeated runs idempotent.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use campipe_models::{BlockState, TimeBlock};
use campipe_queue::WorkQueueClient;

use crate::camera::CameraDirectoryCache;
use crate::classifier::BlockClassifier;
use crate::config::SchedulerConfig;
use crate::error::SchedulerResult;
use crate::window::{
    parse_range, parse_reprocess_date, parse_timezone, BlockPolicy, OperatingWindow,
};

/// Operator input for one scheduling run.
#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub environment: String,
    /// IANA timezone name of the classroom.
    pub timezone: String,
    /// Operating hours, `HH:MM-HH:MM`.
    pub hours: String,
    /// Explicit date/time to reprocess instead of "now".
    pub reprocess_date: Option<String>,
    pub check_yesterday: bool,
    pub include_weekends: bool,
}

impl ScheduleOptions {
    /// Validate the options and work out the blocks to check.
    ///
    /// `now` is only used when no reprocess date was given. All parsing
    /// happens here, before any queue is touched.
    pub fn plan(&self, now: DateTime<Utc>) -> SchedulerResult<DispatchPlan> {
        let tz = parse_timezone(&self.timezone)?;

        let (classroom_now, policy, reprocessing) = match &self.reprocess_date {
            Some(value) => (parse_reprocess_date(value, tz)?, BlockPolicy::reprocessing(), true),
            None => (
                now.with_timezone(&tz),
                BlockPolicy {
                    check_yesterday: self.check_yesterday,
                    include_weekends: self.include_weekends,
                },
                false,
            ),
        };

        let window = parse_range(&self.hours, classroom_now.date_naive(), tz)?;
        let blocks = policy.select(&window, classroom_now.weekday());

        Ok(DispatchPlan {
            environment: self.environment.clone(),
            classroom_now,
            window,
            policy,
            reprocessing,
            blocks,
        })
    }
}

/// The resolved set of blocks for one run.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub environment: String,
    pub classroom_now: DateTime<Tz>,
    pub window: OperatingWindow,
    pub policy: BlockPolicy,
    pub reprocessing: bool,
    pub blocks: Vec<TimeBlock>,
}

impl DispatchPlan {
    /// Log the run parameters.
    pub fn log(&self) {
        let label = if self.reprocessing { "process time" } else { "current time" };
        info!(
            environment = %self.environment,
            timezone = %self.window.timezone(),
            "{}: {} (UTC), {}",
            label,
            self.classroom_now.with_timezone(&Utc).to_rfc3339(),
            self.classroom_now.to_rfc3339()
        );
        debug!(
            start = %self.window.start_local(),
            duration_minutes = self.window.duration().num_minutes(),
            check_yesterday = self.policy.check_yesterday,
            include_weekends = self.policy.include_weekends,
            "Operating window"
        );
        info!(blocks = self.blocks.len(), "Blocks to check");
    }
}

/// Counts from one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub blocks_checked: usize,
    pub cameras: usize,
    pub needs_extraction: usize,
    pub needs_pose_estimation: usize,
    pub complete: usize,
    /// Entries that were not already queued.
    pub newly_queued: usize,
}

impl DispatchSummary {
    /// Blocks routed to a queue.
    pub fn actionable(&self) -> usize {
        self.needs_extraction + self.needs_pose_estimation
    }
}

/// Populates the frames and poses queues.
pub struct Dispatcher {
    cameras: CameraDirectoryCache,
    classifier: BlockClassifier,
    queue: WorkQueueClient,
}

impl Dispatcher {
    pub fn new(
        cameras: CameraDirectoryCache,
        classifier: BlockClassifier,
        queue: WorkQueueClient,
    ) -> Self {
        Self {
            cameras,
            classifier,
            queue,
        }
    }

    pub fn from_config(config: &SchedulerConfig, queue: WorkQueueClient) -> Self {
        Self::new(
            CameraDirectoryCache::new(&config.video_root),
            BlockClassifier::from_config(config),
            queue,
        )
    }

    pub fn queue(&self) -> &WorkQueueClient {
        &self.queue
    }

    /// Classify every planned block and enqueue the actionable ones.
    pub async fn dispatch(&self, plan: &DispatchPlan) -> SchedulerResult<DispatchSummary> {
        let cameras = self.cameras.cameras(&plan.environment).await?;
        let mut summary = DispatchSummary {
            blocks_checked: plan.blocks.len(),
            cameras: cameras.len(),
            ..DispatchSummary::default()
        };

        for block in &plan.blocks {
            for assessment in self.classifier.classify(&cameras, block).await? {
                match assessment.state {
                    BlockState::NeedsExtraction => summary.needs_extraction += 1,
                    BlockState::NeedsPoseEstimation => summary.needs_pose_estimation += 1,
                    BlockState::Complete => summary.complete += 1,
                }

                let Some(kind) = assessment.state.queue() else {
                    continue;
                };
                if self.queue.enqueue(kind, &assessment.entry).await? {
                    summary.newly_queued += 1;
                }
                debug!(
                    queue = %kind,
                    frames_dir = %assessment.entry.frames_dir.display(),
                    frame_count = ?assessment.frame_count,
                    "Block queued"
                );
            }
        }

        info!(
            actionable = summary.actionable(),
            frames = summary.needs_extraction,
            poses = summary.needs_pose_estimation,
            complete = summary.complete,
            newly_queued = summary.newly_queued,
            "Blocks that need to be addressed: {}",
            summary.actionable()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use chrono::{TimeZone, Timelike};
    use std::sync::Arc;

    use campipe_models::QueueKind;
    use campipe_queue::{MemorySetStore, QueueConfig};

    fn options(reprocess: Option<&str>) -> ScheduleOptions {
        ScheduleOptions {
            environment: "room-a".to_string(),
            timezone: "US/Central".to_string(),
            hours: "07:30-16:30".to_string(),
            reprocess_date: reprocess.map(str::to_string),
            check_yesterday: true,
            include_weekends: false,
        }
    }

    #[test]
    fn test_plan_uses_classroom_date() {
        // 03:00 UTC on Thursday is still Wednesday evening in US/Central.
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 3, 0, 0).unwrap();
        let plan = options(None).plan(now).unwrap();
        assert_eq!(plan.classroom_now.weekday(), chrono::Weekday::Wed);
        assert_eq!(plan.blocks.len(), 108);
        assert!(!plan.reprocessing);
    }

    #[test]
    fn test_reprocess_forces_single_day_including_weekends() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 3, 0, 0).unwrap();
        let plan = options(Some("2024-03-10 12:00")).plan(now).unwrap();
        assert!(plan.reprocessing);
        assert_eq!(plan.policy, BlockPolicy::reprocessing());
        assert_eq!(plan.classroom_now.hour(), 12);
        assert_eq!(plan.blocks.len(), 54);
    }

    #[test]
    fn test_bad_input_fails_before_dispatch() {
        let now = Utc::now();
        let mut bad_hours = options(None);
        bad_hours.hours = "16:30-07:30".to_string();
        assert!(bad_hours.plan(now).unwrap_err().is_input_error());

        let mut bad_tz = options(None);
        bad_tz.timezone = "Nowhere/Special".to_string();
        assert!(matches!(bad_tz.plan(now), Err(SchedulerError::InvalidTimezone(_))));

        assert!(matches!(
            options(Some("yesterday-ish")).plan(now),
            Err(SchedulerError::InvalidReprocessDate(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_routes_blocks_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedulerConfig {
            video_root: dir.path().join("video"),
            frame_root: dir.path().join("frames"),
            ..SchedulerConfig::default()
        };
        let camera = config.video_root.join("room-a").join("0a1b2c3d-0000-4000-8000-000000000001");

        // 07:30 block: raw video only. 07:40 block: fully extracted.
        let hour = camera.join("2024/03/06/07");
        std::fs::create_dir_all(&hour).unwrap();
        for prefix in [3, 4] {
            for i in 0..60 {
                let name = format!("{prefix}{}_{:02}.mp4", i % 10, i / 10);
                std::fs::write(hour.join(name), b"").unwrap();
            }
        }
        let frames = config
            .frame_root
            .join("room-a/0a1b2c3d-0000-4000-8000-000000000001/2024/03/06/07/frames__4");
        std::fs::create_dir_all(&frames).unwrap();
        for i in 0..5800 {
            std::fs::write(frames.join(format!("40_00_{i:04}.png")), b"").unwrap();
        }

        let store = Arc::new(MemorySetStore::new());
        let queue = WorkQueueClient::new(store, QueueConfig::default());
        let dispatcher = Dispatcher::from_config(&config, queue.clone());

        let now = Utc.with_ymd_and_hms(2024, 3, 6, 20, 0, 0).unwrap();
        let mut opts = options(None);
        opts.check_yesterday = false;
        let plan = opts.plan(now).unwrap();

        let summary = dispatcher.dispatch(&plan).await.unwrap();
        assert_eq!(summary.needs_extraction, 1);
        assert_eq!(summary.needs_pose_estimation, 1);
        assert_eq!(summary.newly_queued, 2);
        assert_eq!(queue.size(QueueKind::Frames).await.unwrap(), 1);
        assert_eq!(queue.size(QueueKind::Poses).await.unwrap(), 1);

        let again = dispatcher.dispatch(&plan).await.unwrap();
        assert_eq!(again.actionable(), 2);
        assert_eq!(again.newly_queued, 0);
        assert_eq!(queue.size(QueueKind::Frames).await.unwrap(), 1);
    }
}
