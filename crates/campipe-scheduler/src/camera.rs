//! Camera directory discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use campipe_models::CameraPath;

use crate::error::{SchedulerError, SchedulerResult};

/// Lists camera directories per environment, caching each listing.
///
/// The archive layout is assumed not to change during a run, so entries are
/// never invalidated. Each dispatcher owns its own cache.
#[derive(Debug)]
pub struct CameraDirectoryCache {
    video_root: PathBuf,
    cache: Mutex<HashMap<String, Arc<[CameraPath]>>>,
}

impl CameraDirectoryCache {
    pub fn new(video_root: impl Into<PathBuf>) -> Self {
        Self {
            video_root: video_root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn video_root(&self) -> &Path {
        &self.video_root
    }

    /// Camera directories under `{video_root}/{environment}`, sorted by path.
    pub async fn cameras(&self, environment: &str) -> SchedulerResult<Arc<[CameraPath]>> {
        let mut cache = self.cache.lock().await;
        if let Some(cameras) = cache.get(environment) {
            return Ok(Arc::clone(cameras));
        }

        let cameras: Arc<[CameraPath]> = self.scan(environment).await?.into();
        debug!(environment, count = cameras.len(), "Discovered camera directories");
        cache.insert(environment.to_string(), Arc::clone(&cameras));
        Ok(cameras)
    }

    async fn scan(&self, environment: &str) -> SchedulerResult<Vec<CameraPath>> {
        let root = self.video_root.join(environment);
        let mut entries = match fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SchedulerError::EnvironmentNotFound(root));
            }
            Err(e) => return Err(e.into()),
        };

        let mut cameras = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(camera) = CameraPath::from_dir(entry.path()) {
                cameras.push(camera);
            }
        }
        cameras.sort();
        Ok(cameras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAM_A: &str = "0a1b2c3d-0000-4000-8000-00000000000a";
    const CAM_B: &str = "0a1b2c3d-0000-4000-8000-00000000000b";

    #[tokio::test]
    async fn test_lists_only_camera_directories() {
        let root = tempfile::tempdir().unwrap();
        let env = root.path().join("room-a");
        std::fs::create_dir_all(env.join(CAM_B)).unwrap();
        std::fs::create_dir_all(env.join(CAM_A)).unwrap();
        std::fs::create_dir_all(env.join("frames")).unwrap();
        std::fs::write(env.join("0a1b2c3d-0000-4000-8000-00000000000c"), b"").unwrap();

        let cache = CameraDirectoryCache::new(root.path());
        let cameras = cache.cameras("room-a").await.unwrap();
        let ids: Vec<_> = cameras.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec![CAM_A.to_string(), CAM_B.to_string()]);
    }

    #[tokio::test]
    async fn test_listing_is_cached_per_environment() {
        let root = tempfile::tempdir().unwrap();
        let env = root.path().join("room-a");
        std::fs::create_dir_all(env.join(CAM_A)).unwrap();

        let cache = CameraDirectoryCache::new(root.path());
        assert_eq!(cache.cameras("room-a").await.unwrap().len(), 1);

        std::fs::create_dir_all(env.join(CAM_B)).unwrap();
        assert_eq!(cache.cameras("room-a").await.unwrap().len(), 1);

        let fresh = CameraDirectoryCache::new(root.path());
        assert_eq!(fresh.cameras("room-a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_environment_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let cache = CameraDirectoryCache::new(root.path());
        assert!(matches!(
            cache.cameras("nowhere").await,
            Err(SchedulerError::EnvironmentNotFound(_))
        ));
    }
}
