use std::path::PathBuf;

use super::{CaptureError, CapturedSnapshot, SnapshotSource};
use crate::geometry::VisibleRegion;
use crate::texture::ImageSource;

/// A snapshot that was already captured and saved to disk
///
/// Stands in for a live map surface when replaying a capture offline.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
    visible_region: Option<VisibleRegion>,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            visible_region: None,
        }
    }

    /// Region the saved image is known to cover
    pub fn with_visible_region(mut self, region: VisibleRegion) -> Self {
        self.visible_region = Some(region);
        self
    }
}

impl SnapshotSource for FileSnapshotSource {
    async fn capture(&self, _region: &VisibleRegion) -> Result<CapturedSnapshot, CaptureError> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            CaptureError::Failed(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(CaptureError::Failed(format!(
                "{} is not a file",
                self.path.display()
            )));
        }

        Ok(CapturedSnapshot {
            image: ImageSource::Path(self.path.clone()),
            visible_region: self.visible_region,
        })
    }
}
