//! Dispatch-then-extract scenario over a temporary archive.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use campipe_media::{FrameExtractor, MediaResult};
use campipe_models::QueueKind;
use campipe_queue::{MemorySetStore, QueueConfig, WorkQueueClient};
use campipe_scheduler::{Dispatcher, ScheduleOptions, SchedulerConfig};
use campipe_worker::{ExtractionWorker, PollOutcome, WorkerConfig};

const CAMERA: &str = "5f0c1d2e-3a4b-4c5d-8e6f-7a8b9c0d1e2f";

/// Writes three frames per source, like a short clip through FFmpeg.
struct AlwaysSucceeds;

#[async_trait]
impl FrameExtractor for AlwaysSucceeds {
    async fn extract(&self, _input: &Path, output_pattern: &Path) -> MediaResult<()> {
        let pattern = output_pattern.to_string_lossy();
        for i in 1..=3 {
            std::fs::write(pattern.replace("%03d", &format!("{i:03}")), b"png")?;
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_yesterday_block_is_dispatched_and_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let config = SchedulerConfig {
        video_root: dir.path().join("video"),
        frame_root: dir.path().join("frames"),
        ..SchedulerConfig::default()
    };

    // Wednesday 2024-03-06, 07:30 block: 60 videos, no frame directory.
    let hour_dir = config
        .video_root
        .join("room-a")
        .join(CAMERA)
        .join("2024/03/06/07");
    std::fs::create_dir_all(&hour_dir).unwrap();
    for minute in 30..40 {
        for second in (0..60).step_by(10) {
            std::fs::write(hour_dir.join(format!("{minute}_{second:02}.mp4")), b"").unwrap();
        }
    }

    let store = Arc::new(MemorySetStore::new());
    let queue = WorkQueueClient::new(store.clone(), QueueConfig::default());
    let dispatcher = Dispatcher::from_config(&config, queue.clone());

    // Thursday afternoon in US/Central; yesterday was Wednesday.
    let now = Utc.with_ymd_and_hms(2024, 3, 7, 20, 0, 0).unwrap();
    let plan = ScheduleOptions {
        environment: "room-a".to_string(),
        timezone: "US/Central".to_string(),
        hours: "07:30-16:30".to_string(),
        reprocess_date: None,
        check_yesterday: true,
        include_weekends: false,
    }
    .plan(now)
    .unwrap();

    let summary = dispatcher.dispatch(&plan).await.unwrap();
    assert_eq!(summary.blocks_checked, 108);
    assert_eq!(summary.needs_extraction, 1);
    assert_eq!(summary.needs_pose_estimation, 0);
    assert_eq!(queue.size(QueueKind::Frames).await.unwrap(), 1);

    let worker = ExtractionWorker::new(
        WorkerConfig::default(),
        queue.clone(),
        Arc::new(AlwaysSucceeds),
    );
    let report = match worker.poll_once().await.unwrap() {
        PollOutcome::Processed(report) => report,
        PollOutcome::Empty => panic!("expected a queued block"),
    };

    let frames_dir = config
        .frame_root
        .join("room-a")
        .join(CAMERA)
        .join("2024/03/06/07/frames__3");
    assert_eq!(report.entry.frames_dir, frames_dir);
    assert_eq!(report.sources, 60);
    assert_eq!(report.failed, 0);
    assert!(frames_dir.join("30_00_001.png").exists());
    assert!(frames_dir.join("39_50_003.png").exists());
    assert_eq!(std::fs::read_dir(&frames_dir).unwrap().count(), 180);

    assert_eq!(queue.size(QueueKind::DeadFrames).await.unwrap(), 0);
    assert_eq!(worker.poll_once().await.unwrap(), PollOutcome::Empty);
}
