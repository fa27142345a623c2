//! Camera archive roots.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;

/// Camera ids are UUID-shaped directory names.
pub const CAMERA_ID_LEN: usize = 36;

/// Root of one camera's video archive, `{VIDEO_ROOT}/{environment}/{camera-id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraPath(PathBuf);

impl CameraPath {
    /// Wrap `path` if its final component looks like a camera id.
    pub fn from_dir(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?;
        if Self::is_camera_id(name) {
            Some(Self(path))
        } else {
            None
        }
    }

    /// Camera ids are exactly [`CAMERA_ID_LEN`] characters.
    pub fn is_camera_id(name: &str) -> bool {
        name.chars().count() == CAMERA_ID_LEN
    }

    pub fn id(&self) -> &str {
        self.0
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory holding the source videos for `block`'s hour.
    pub fn hour_dir(&self, block: &TimeBlock) -> PathBuf {
        self.0.join(block.hour_path())
    }
}

impl fmt::Display for CameraPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMERA: &str = "0a1b2c3d-0000-4000-8000-000000000001";

    #[test]
    fn test_accepts_36_char_names_only() {
        assert!(CameraPath::from_dir(format!("/data/room-a/{CAMERA}")).is_some());
        assert!(CameraPath::from_dir("/data/room-a/frames").is_none());
        assert!(CameraPath::from_dir(format!("/data/room-a/{CAMERA}x")).is_none());
    }

    #[test]
    fn test_id() {
        let camera = CameraPath::from_dir(format!("/data/room-a/{CAMERA}")).unwrap();
        assert_eq!(camera.id(), CAMERA);
    }
}
