use image::{Rgba, RgbaImage};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cancel::CancelToken;

/// Where a snapshot image comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("no image resource provided")]
    Missing,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has zero width or height")]
    Empty,
    #[error("texture loading timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampling flags the render surface applies when uploading the texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFilter {
    pub min: FilterMode,
    pub mag: FilterMode,
    pub generate_mipmaps: bool,
    /// Upload rows bottom-up so UV (0, 0) samples the image's bottom-left
    pub flip_y: bool,
}

impl Default for TextureFilter {
    fn default() -> Self {
        Self {
            min: FilterMode::Linear,
            mag: FilterMode::Linear,
            generate_mipmaps: false,
            flip_y: true,
        }
    }
}

/// A decoded snapshot ready to be uploaded as a texture
#[derive(Debug, Clone)]
pub struct TextureResource {
    image: RgbaImage,
    filter: TextureFilter,
}

impl TextureResource {
    pub fn new(image: RgbaImage, filter: TextureFilter) -> Result<Self, TextureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty);
        }
        Ok(Self { image, filter })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Height over width, the aspect the mesh is built with
    pub fn aspect_ratio(&self) -> f32 {
        self.image.height() as f32 / self.image.width() as f32
    }

    /// Nearest texel for a UV coordinate, honoring `flip_y`
    pub fn sample(&self, u: f32, v: f32) -> Rgba<u8> {
        let max_x = (self.image.width() - 1) as f32;
        let max_y = (self.image.height() - 1) as f32;
        let row = if self.filter.flip_y { 1.0 - v } else { v };

        let x = (u.clamp(0.0, 1.0) * max_x).round() as u32;
        let y = (row.clamp(0.0, 1.0) * max_y).round() as u32;
        *self.image.get_pixel(x, y)
    }
}

/// Decode an image synchronously into a texture with default filtering
pub fn decode_image(source: &ImageSource) -> Result<TextureResource, TextureError> {
    let decoded = match source {
        ImageSource::Path(path) => image::open(path)?,
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?,
    };
    TextureResource::new(decoded.to_rgba8(), TextureFilter::default())
}

/// Loads textures with a single bounded attempt
#[derive(Debug, Clone)]
pub struct TextureLoader {
    timeout: Duration,
}

impl TextureLoader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decode `source` off the async runtime
    ///
    /// Returns `None` when `cancel` fires first: the decode is abandoned and
    /// neither a texture nor an error is reported. Timeout and decode failure
    /// both come back as `Some(Err(_))`.
    pub async fn load(
        &self,
        source: ImageSource,
        cancel: &CancelToken,
    ) -> Option<Result<TextureResource, TextureError>> {
        let decode = async move {
            match tokio::task::spawn_blocking(move || decode_image(&source)).await {
                Ok(result) => result,
                Err(e) => Err(TextureError::Task(e.to_string())),
            }
        };
        self.load_with(decode, cancel).await
    }

    /// Race an arbitrary decode future against the timeout and `cancel`
    pub async fn load_with<F>(
        &self,
        decode: F,
        cancel: &CancelToken,
    ) -> Option<Result<TextureResource, TextureError>>
    where
        F: Future<Output = Result<TextureResource, TextureError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("view closed, abandoning texture load");
                None
            }
            result = tokio::time::timeout(self.timeout, decode) => Some(match result {
                Ok(loaded) => loaded,
                Err(_) => Err(TextureError::Timeout(self.timeout)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::fixtures::png_bytes;

    #[test]
    fn test_decode_png() {
        let texture = decode_image(&ImageSource::Bytes(png_bytes(8, 4))).unwrap();

        assert_eq!(texture.width(), 8);
        assert_eq!(texture.height(), 4);
        assert_eq!(texture.aspect_ratio(), 0.5);
        assert_eq!(texture.filter(), TextureFilter::default());
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_image(&ImageSource::Bytes(b"not an image".to_vec()));
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_image(&ImageSource::Path(PathBuf::from("/nonexistent/snap.png")));
        assert!(result.is_err());
    }

    #[test]
    fn test_uv_origin_is_bottom_left() {
        let texture = decode_image(&ImageSource::Bytes(png_bytes(4, 4))).unwrap();

        assert_eq!(texture.sample(0.0, 0.0), Rgba([0, 0, 255, 255]));
        assert_eq!(texture.sample(0.0, 1.0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_empty_image_rejected() {
        let result = TextureResource::new(RgbaImage::new(0, 4), TextureFilter::default());
        assert!(matches!(result, Err(TextureError::Empty)));
    }

    #[tokio::test]
    async fn test_load_success() {
        let loader = TextureLoader::new(Duration::from_secs(5));
        let cancel = CancelToken::new();

        let result = loader
            .load(ImageSource::Bytes(png_bytes(2, 2)), &cancel)
            .await;
        assert!(matches!(result, Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_load_timeout() {
        let loader = TextureLoader::new(Duration::from_millis(20));
        let cancel = CancelToken::new();

        let result = loader
            .load_with(std::future::pending::<Result<TextureResource, TextureError>>(), &cancel)
            .await;
        assert!(matches!(result, Some(Err(TextureError::Timeout(_)))));
    }

    #[tokio::test]
    async fn test_load_cancelled_reports_nothing() {
        let loader = TextureLoader::new(Duration::from_secs(5));
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = loader
            .load(ImageSource::Bytes(png_bytes(2, 2)), &cancel)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cancel_during_pending_decode() {
        let loader = TextureLoader::new(Duration::from_secs(5));
        let cancel = CancelToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = loader
            .load_with(std::future::pending::<Result<TextureResource, TextureError>>(), &cancel)
            .await;
        assert!(result.is_none());
    }
}
