//! Frame extraction worker.
//!
//! Blocks are claimed by popping them from the frames queue, so concurrent
//! workers never share a block. A block whose extraction fails for any of
//! its source files is added to the dead letter queue; it is not retried.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use campipe_media::{frame_pattern, FfmpegFrameExtractor, FfmpegRunner, FrameExtractor};
use campipe_models::{QueueEntry, QueueKind};
use campipe_queue::WorkQueueClient;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::BlockLogger;

/// Result of one extraction pass over a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub entry: QueueEntry,
    /// Source videos found for the block.
    pub sources: usize,
    /// Source videos whose extraction failed.
    pub failed: usize,
    pub dead_lettered: bool,
}

/// Outcome of a single dequeue attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Empty,
    Processed(BlockReport),
}

/// Consumes the frames queue and extracts frames block by block.
pub struct ExtractionWorker {
    config: WorkerConfig,
    queue: WorkQueueClient,
    extractor: Arc<dyn FrameExtractor>,
    shutdown: watch::Sender<bool>,
    worker_id: String,
}

impl ExtractionWorker {
    pub fn new(
        config: WorkerConfig,
        queue: WorkQueueClient,
        extractor: Arc<dyn FrameExtractor>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            queue,
            extractor,
            shutdown,
            worker_id: format!("worker-{}", Uuid::new_v4()),
        }
    }

    /// Worker that runs FFmpeg from `config.ffmpeg_path`.
    pub fn with_ffmpeg(config: WorkerConfig, queue: WorkQueueClient) -> Self {
        let extractor = FfmpegFrameExtractor::new(FfmpegRunner::new(&config.ffmpeg_path));
        Self::new(config, queue, Arc::new(extractor))
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Ask the run loop to stop. An in-flight block is finished first.
    ///
    /// The flag is kept even when no run loop is listening yet.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Consume blocks until shut down, or until one block has been processed
    /// when `run_once` is set. Returns the number of blocks processed.
    pub async fn run(&self) -> WorkerResult<usize> {
        info!(
            worker_id = %self.worker_id,
            run_once = self.config.run_once,
            "Starting frames worker"
        );

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut processed = 0;

        loop {
            if *shutdown_rx.borrow() {
                info!("Shutdown signal received, stopping worker");
                break;
            }

            match self.poll_once().await {
                Ok(PollOutcome::Processed(_)) => {
                    processed += 1;
                    if self.config.run_once {
                        break;
                    }
                }
                Ok(PollOutcome::Empty) => {
                    debug!("Queue is empty");
                    if self.backoff(&mut shutdown_rx).await {
                        info!("Shutdown signal received, stopping worker");
                        break;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping queue entry: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(worker_id = %self.worker_id, processed, "Frames worker stopped");
        Ok(processed)
    }

    /// Dequeue one block and process it.
    pub async fn poll_once(&self) -> WorkerResult<PollOutcome> {
        match self.queue.dequeue(QueueKind::Frames).await? {
            Some(entry) => Ok(PollOutcome::Processed(self.process_block(&entry).await?)),
            None => Ok(PollOutcome::Empty),
        }
    }

    /// Extract frames for every source video of `entry`.
    ///
    /// Per-file failures dead-letter the block and processing continues with
    /// the next file. Only queue service errors are returned.
    pub async fn process_block(&self, entry: &QueueEntry) -> WorkerResult<BlockReport> {
        let logger = BlockLogger::new(&self.worker_id, entry);
        let span = logger.create_span();
        self.extract_block(entry, &logger).instrument(span).await
    }

    async fn extract_block(
        &self,
        entry: &QueueEntry,
        logger: &BlockLogger,
    ) -> WorkerResult<BlockReport> {
        let mut report = BlockReport {
            entry: entry.clone(),
            sources: 0,
            failed: 0,
            dead_lettered: false,
        };

        if let Err(e) = fs::create_dir_all(&entry.frames_dir).await {
            logger.log_error(&format!("cannot create {}: {}", entry.frames_dir.display(), e));
            self.queue.dead_letter(entry).await?;
            report.dead_lettered = true;
            return Ok(report);
        }

        let sources = match source_files(entry).await {
            Ok(sources) => sources,
            Err(e) => {
                logger.log_error(&format!("cannot list {}: {}", entry.hour_dir.display(), e));
                self.queue.dead_letter(entry).await?;
                report.dead_lettered = true;
                return Ok(report);
            }
        };
        report.sources = sources.len();

        if sources.is_empty() {
            logger.log_warning(&format!("no source videos in {}", entry.hour_dir.display()));
        } else {
            logger.log_start(&format!("{} source videos", sources.len()));
        }

        for source in &sources {
            logger.log_progress(&format!("processing video {}", source.display()));
            let pattern = frame_pattern(&entry.frames_dir, source);
            if let Err(e) = self.extractor.extract(source, &pattern).await {
                report.failed += 1;
                logger.log_error(&format!("processing video {} failed: {}", source.display(), e));
                if !report.dead_lettered {
                    self.queue.dead_letter(entry).await?;
                    report.dead_lettered = true;
                }
            }
        }

        logger.log_completion(&format!(
            "{} of {} videos extracted",
            report.sources - report.failed,
            report.sources
        ));
        Ok(report)
    }

    /// Sleep for the poll interval. Returns `true` if shutdown was requested.
    async fn backoff(&self, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.config.poll_interval) => false,
            changed = shutdown_rx.changed() => changed.is_err() || *shutdown_rx.borrow(),
        }
    }
}

/// Regular files in the entry's hour directory belonging to its block,
/// sorted by name. A missing directory yields no files.
async fn source_files(entry: &QueueEntry) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(&entry.hour_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(dir_entry) = entries.next_entry().await? {
        if !dir_entry.file_type().await?.is_file() {
            continue;
        }
        if entry.matches_source(&dir_entry.file_name().to_string_lossy()) {
            files.push(dir_entry.path());
        }
    }
    files.sort();
    Ok(files)
}
