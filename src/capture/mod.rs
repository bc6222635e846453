//! Snapshot capture around an external map surface
//!
//! The map surface is not implemented here. It is reached through
//! [`SnapshotSource`], and it signals once that it is ready to be captured.
//! Capture waits for that signal (bounded by a timeout), then an optional
//! settle delay for tiles to finish drawing, then asks the source for an
//! image. Every wait is raced against the owning view's [`CancelToken`].

pub mod file;

pub use file::FileSnapshotSource;

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::PipelineConfig;
use crate::geometry::{BoundingBox, VisibleRegion};
use crate::texture::ImageSource;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("map surface was not ready within {0:?}")]
    NotReady(Duration),
    #[error("map surface went away before it was ready")]
    SurfaceClosed,
    #[error("snapshot capture failed: {0}")]
    Failed(String),
}

/// What a map surface hands back after a capture
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSnapshot {
    pub image: ImageSource,
    /// The region the surface actually displayed, if it adjusted the request
    pub visible_region: Option<VisibleRegion>,
}

/// A map surface that can render a region into an image
pub trait SnapshotSource {
    fn capture(
        &self,
        region: &VisibleRegion,
    ) -> impl Future<Output = Result<CapturedSnapshot, CaptureError>> + Send;
}

/// Ready signal fired by the map surface once it can be captured
pub type ReadySignal = oneshot::Receiver<()>;

/// A captured image together with the bounds it covers
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResult {
    pub image: ImageSource,
    /// Bounds to normalize the polygon against
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone)]
pub struct SnapshotCapture {
    settle_delay: Duration,
    ready_timeout: Duration,
}

impl SnapshotCapture {
    pub fn new(settle_delay: Duration, ready_timeout: Duration) -> Self {
        Self {
            settle_delay,
            ready_timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.settle_delay, config.ready_timeout)
    }

    /// Capture `bounds` from `source`
    ///
    /// Returns `None` if `cancel` fires before the capture completes. The
    /// result's bounds are those of the region the surface reports having
    /// shown, falling back to the requested bounds.
    pub async fn capture<S: SnapshotSource>(
        &self,
        source: &S,
        bounds: &BoundingBox,
        ready: ReadySignal,
        cancel: &CancelToken,
    ) -> Option<Result<CaptureResult, CaptureError>> {
        let work = async {
            match tokio::time::timeout(self.ready_timeout, ready).await {
                Err(_) => return Err(CaptureError::NotReady(self.ready_timeout)),
                Ok(Err(_)) => return Err(CaptureError::SurfaceClosed),
                Ok(Ok(())) => {}
            }

            if !self.settle_delay.is_zero() {
                debug!(delay = ?self.settle_delay, "waiting for map tiles to settle");
                tokio::time::sleep(self.settle_delay).await;
            }

            let snapshot = source.capture(&bounds.region()).await?;
            let bounds = match snapshot.visible_region {
                Some(region) => {
                    info!(?region, "using visible region reported by map surface");
                    BoundingBox::from_region(&region)
                }
                None => *bounds,
            };

            Ok(CaptureResult {
                image: snapshot.image,
                bounds,
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("view closed, abandoning snapshot capture");
                None
            }
            result = work => Some(result),
        }
    }
}
