//! Drawn polygon to renderable scene
//!
//! bounds -> normalize -> triangulate/mesh -> material. Only the texture load
//! is asynchronous; everything before it is pure.

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::capture::CaptureResult;
use crate::config::PipelineConfig;
use crate::domain::GeoPolygon;
use crate::geometry::{BoundingBox, Normalization, normalize_polygon, select_bounds};
use crate::texture::{SceneDescription, resolve_scene};

/// A polygon normalized against the bounds it will be textured with
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPolygon {
    pub bounds: Option<BoundingBox>,
    pub normalization: Normalization,
}

/// Normalize a polygon snapshot, preferring the captured region's bounds
pub fn prepare_polygon(polygon: &GeoPolygon, captured: Option<BoundingBox>) -> PreparedPolygon {
    let bounds = select_bounds(polygon.as_slice(), captured);
    let normalization = normalize_polygon(polygon.as_slice(), bounds.as_ref());

    if normalization.is_degenerate() {
        warn!(points = polygon.len(), "polygon collapsed to a single point");
    }
    debug!(points = normalization.len(), ?bounds, "normalized polygon");

    PreparedPolygon {
        bounds,
        normalization,
    }
}

/// Run the whole pipeline for one polygon and its (optional) capture
///
/// Returns `None` if the view is torn down while the texture loads.
pub async fn build_scene(
    polygon: &GeoPolygon,
    capture: Option<CaptureResult>,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> Option<(PreparedPolygon, SceneDescription)> {
    let (image, captured_bounds) = match capture {
        Some(c) => (Some(c.image), Some(c.bounds)),
        None => (None, None),
    };

    let prepared = prepare_polygon(polygon, captured_bounds);
    let scene = resolve_scene(prepared.normalization.points(), image, config, cancel).await?;
    Some((prepared, scene))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use crate::geometry::NormalizedPoint;
    use crate::texture::{ImageSource, SceneKind, fixtures::png_bytes};

    fn square() -> GeoPolygon {
        GeoPolygon::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ])
    }

    #[test]
    fn test_square_scenario() {
        let prepared = prepare_polygon(&square(), None);
        let bounds = prepared.bounds.unwrap();

        assert_eq!(bounds.center, GeoPoint::new(5.0, 5.0));
        assert_eq!((bounds.latitude_delta, bounds.longitude_delta), (10.0, 10.0));
        assert_eq!(
            prepared.normalization.points(),
            &[
                NormalizedPoint::new(0.0, 0.0),
                NormalizedPoint::new(1.0, 0.0),
                NormalizedPoint::new(1.0, 1.0),
                NormalizedPoint::new(0.0, 1.0),
            ]
        );
        let triangles = crate::mesh::triangulate_polygon(prepared.normalization.points());
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_empty_polygon() {
        let prepared = prepare_polygon(&GeoPolygon::default(), None);
        assert!(prepared.bounds.is_none());
        assert_eq!(prepared.normalization, Normalization::Empty);
    }

    #[tokio::test]
    async fn test_captured_bounds_take_precedence() {
        let capture = CaptureResult {
            image: ImageSource::Bytes(png_bytes(4, 4)),
            bounds: BoundingBox::new(-10.0, 20.0, -10.0, 20.0),
        };

        let (prepared, scene) = build_scene(
            &square(),
            Some(capture),
            &PipelineConfig::default(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(prepared.bounds.unwrap().min_lat, -10.0);
        assert!(matches!(scene.kind, SceneKind::Textured));
        // The polygon covers the middle third of the capture
        let (lo, hi) = scene.mesh.extent().unwrap();
        assert!((hi[0] - lo[0] - 10.0 / 3.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_no_capture_is_untextured() {
        let (_, scene) = build_scene(
            &square(),
            None,
            &PipelineConfig::default(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(scene.kind, SceneKind::Untextured { .. }));
    }
}
