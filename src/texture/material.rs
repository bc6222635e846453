//! Pairing the clipped mesh with a material
//!
//! Three outcomes, in order of preference:
//! - snapshot decoded and polygon usable: textured mesh built with the
//!   image's own aspect ratio
//! - polygon usable but no texture: solid-color mesh of the same shape
//! - no usable polygon: fixed-size placeholder plane
//!
//! A missing image, a corrupt image and a decode timeout all lead to the
//! second outcome. The cause is kept on the scene so callers can report it.

use std::sync::Arc;
use tracing::{debug, warn};

use super::{CancelToken, ImageSource, TextureError, TextureLoader, TextureResource};
use crate::config::PipelineConfig;
use crate::geometry::NormalizedPoint;
use crate::mesh::{MeshDescription, build_placeholder_plane, build_polygon_mesh};

#[derive(Debug, Clone)]
pub enum Material {
    Textured {
        texture: Arc<TextureResource>,
        double_sided: bool,
    },
    SolidColor {
        /// 0xRRGGBB
        color: u32,
        double_sided: bool,
    },
}

impl Material {
    pub fn is_textured(&self) -> bool {
        matches!(self, Material::Textured { .. })
    }

    pub fn color(&self) -> Option<u32> {
        match self {
            Material::SolidColor { color, .. } => Some(*color),
            Material::Textured { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum SceneKind {
    Textured,
    /// Polygon geometry without the snapshot
    Untextured { cause: TextureError },
    /// No usable polygon
    Placeholder,
}

/// Mesh plus material, ready for the render surface
#[derive(Debug)]
pub struct SceneDescription {
    pub mesh: MeshDescription,
    pub material: Material,
    pub kind: SceneKind,
}

/// Build the scene for a normalized polygon and an optional snapshot
///
/// Returns `None` only when `cancel` fires while the texture is loading.
pub async fn resolve_scene(
    points: &[NormalizedPoint],
    image: Option<ImageSource>,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Option<SceneDescription> {
    if points.len() < 3 {
        debug!(points = points.len(), "no usable polygon, using placeholder");
        return Some(placeholder_scene(config));
    }

    let Some(source) = image else {
        warn!("no snapshot available, rendering untextured polygon");
        return Some(untextured_scene(points, config, TextureError::Missing));
    };

    let loader = TextureLoader::new(config.texture_timeout);
    match loader.load(source, cancel).await? {
        Ok(texture) => Some(textured_scene(points, texture, config)),
        Err(err) => {
            warn!(error = %err, "failed to load map texture, rendering untextured polygon");
            Some(untextured_scene(points, config, err))
        }
    }
}

/// Textured outcome for an already-decoded texture
pub fn textured_scene(
    points: &[NormalizedPoint],
    texture: TextureResource,
    config: &PipelineConfig,
) -> SceneDescription {
    match build_polygon_mesh(points, texture.aspect_ratio(), config.scale) {
        Ok(mesh) => SceneDescription {
            mesh,
            material: Material::Textured {
                texture: Arc::new(texture),
                double_sided: true,
            },
            kind: SceneKind::Textured,
        },
        Err(err) => {
            warn!(error = %err, "cannot build polygon mesh, using placeholder");
            placeholder_scene(config)
        }
    }
}

/// Solid-color outcome; the mesh keeps the polygon's shape at aspect 1
pub fn untextured_scene(
    points: &[NormalizedPoint],
    config: &PipelineConfig,
    cause: TextureError,
) -> SceneDescription {
    match build_polygon_mesh(points, 1.0, config.scale) {
        Ok(mesh) => SceneDescription {
            mesh,
            material: Material::SolidColor {
                color: config.fallback_color,
                double_sided: true,
            },
            kind: SceneKind::Untextured { cause },
        },
        Err(err) => {
            warn!(error = %err, "cannot build polygon mesh, using placeholder");
            placeholder_scene(config)
        }
    }
}

pub fn placeholder_scene(config: &PipelineConfig) -> SceneDescription {
    SceneDescription {
        mesh: build_placeholder_plane(config.placeholder_size, config.placeholder_size),
        material: Material::SolidColor {
            color: config.placeholder_color,
            double_sided: true,
        },
        kind: SceneKind::Placeholder,
    }
}
