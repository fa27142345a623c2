use std::path::Path;

use campipe_media::check_ffmpeg;
use campipe_queue::{QueueConfig, RedisSetStore};
use campipe_scheduler::SchedulerConfig;
use campipe_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let worker = WorkerConfig::from_env();
    let storage = SchedulerConfig::from_env();
    let queue = QueueConfig::from_env();

    println!("worker-selfcheck: starting with ffmpeg={}", worker.ffmpeg_path);

    let ffmpeg = check_ffmpeg(&worker.ffmpeg_path)?;
    println!("worker-selfcheck: ffmpeg at {}", ffmpeg.display());

    ensure_dir(&storage.video_root, "VIDEO_STORAGE_DIR")?;
    ensure_dir(&storage.frame_root, "FRAME_STORAGE_DIR")?;

    RedisSetStore::new(&queue.redis_url)?
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("queue service at {} unavailable: {}", queue.redis_url, e))?;

    println!("worker-selfcheck: ok");
    Ok(())
}

fn ensure_dir(path: &Path, var: &str) -> anyhow::Result<()> {
    if !path.is_dir() {
        return Err(anyhow::anyhow!("{} ({}) is not a directory", var, path.display()));
    }
    Ok(())
}
