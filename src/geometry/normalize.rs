//! Flat normalization of geographic coordinates into the unit square
//!
//! Longitude maps to x and latitude to y, both linearly:
//! - x = (lon - min_lng) / (max_lng - min_lng)
//! - y = (lat - min_lat) / (max_lat - min_lat)
//!
//! No projection is applied. The result doubles as UV coordinates for a
//! snapshot of the same bounds, with (0, 0) at the south-west corner.

use tracing::warn;

use super::BoundingBox;
use crate::domain::GeoPoint;

/// A point in the unit square relative to some bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const CENTER: NormalizedPoint = NormalizedPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outcome of normalizing a polygon
///
/// The degenerate and empty cases are kept distinct from a normal mapping so
/// callers have to acknowledge them.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    /// Every point was mapped linearly into the bounds
    Mapped(Vec<NormalizedPoint>),
    /// The bounds had zero width or height; every point sits at (0.5, 0.5)
    Degenerate(Vec<NormalizedPoint>),
    /// No points, or no bounds to normalize against
    Empty,
}

impl Normalization {
    pub fn points(&self) -> &[NormalizedPoint] {
        match self {
            Normalization::Mapped(points) | Normalization::Degenerate(points) => points,
            Normalization::Empty => &[],
        }
    }

    pub fn into_points(self) -> Vec<NormalizedPoint> {
        match self {
            Normalization::Mapped(points) | Normalization::Degenerate(points) => points,
            Normalization::Empty => Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Normalization::Degenerate(_))
    }

    pub fn len(&self) -> usize {
        self.points().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }
}

/// Normalize a polygon against a bounding box
///
/// The bounds do not have to come from `points`: a wider captured region is
/// a valid input, in which case the polygon sits inside the unit square
/// without touching its edges.
pub fn normalize_polygon(points: &[GeoPoint], bounds: Option<&BoundingBox>) -> Normalization {
    if points.is_empty() {
        return Normalization::Empty;
    }

    let Some(bounds) = bounds else {
        warn!("no bounds provided for normalization");
        return Normalization::Empty;
    };

    let lng_range = bounds.max_lng - bounds.min_lng;
    let lat_range = bounds.max_lat - bounds.min_lat;

    if lng_range == 0.0 || lat_range == 0.0 {
        warn!(
            lat_range,
            lng_range, "degenerate polygon bounds, collapsing to center"
        );
        return Normalization::Degenerate(vec![NormalizedPoint::CENTER; points.len()]);
    }

    Normalization::Mapped(
        points
            .iter()
            .map(|p| NormalizedPoint {
                x: (p.longitude - bounds.min_lng) / lng_range,
                y: (p.latitude - bounds.min_lat) / lat_range,
            })
            .collect(),
    )
}

/// Pick the bounds to normalize against
///
/// Bounds of the region that was actually captured win over the polygon's
/// own bounds, since they describe what the snapshot image covers.
pub fn select_bounds(points: &[GeoPoint], captured: Option<BoundingBox>) -> Option<BoundingBox> {
    captured.or_else(|| BoundingBox::from_polygon(points))
}

/// Average of the vertices
pub fn polygon_centroid(points: &[NormalizedPoint]) -> Option<NormalizedPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(NormalizedPoint::new(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ]
    }

    #[test]
    fn test_normalize_square() {
        let points = square();
        let bounds = BoundingBox::from_polygon(&points);
        let normalized = normalize_polygon(&points, bounds.as_ref());

        assert!(matches!(normalized, Normalization::Mapped(_)));
        assert_eq!(
            normalized.points(),
            &[
                NormalizedPoint::new(0.0, 0.0),
                NormalizedPoint::new(1.0, 0.0),
                NormalizedPoint::new(1.0, 1.0),
                NormalizedPoint::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_own_bounds_touch_every_edge() {
        let points = vec![
            GeoPoint::new(51.501, -0.142),
            GeoPoint::new(51.507, -0.128),
            GeoPoint::new(51.512, -0.131),
            GeoPoint::new(51.509, -0.149),
            GeoPoint::new(51.503, -0.151),
        ];
        let bounds = BoundingBox::from_polygon(&points);
        let normalized = normalize_polygon(&points, bounds.as_ref()).into_points();

        assert_eq!(normalized.len(), points.len());
        assert!(normalized.iter().any(|p| p.x == 0.0));
        assert!(normalized.iter().any(|p| p.x == 1.0));
        assert!(normalized.iter().any(|p| p.y == 0.0));
        assert!(normalized.iter().any(|p| p.y == 1.0));
        assert!(
            normalized
                .iter()
                .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y))
        );
    }

    #[test]
    fn test_degenerate_same_latitude() {
        let points = vec![
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(10.0, 5.0),
            GeoPoint::new(10.0, 7.0),
        ];
        let bounds = BoundingBox::from_polygon(&points);
        let normalized = normalize_polygon(&points, bounds.as_ref());

        assert!(normalized.is_degenerate());
        assert_eq!(normalized.len(), 3);
        assert!(
            normalized
                .points()
                .iter()
                .all(|p| *p == NormalizedPoint::CENTER)
        );
    }

    #[test]
    fn test_degenerate_same_longitude() {
        let points = vec![GeoPoint::new(1.0, 3.0), GeoPoint::new(2.0, 3.0)];
        let bounds = BoundingBox::from_polygon(&points);
        let normalized = normalize_polygon(&points, bounds.as_ref());

        assert!(normalized.is_degenerate());
        assert!(normalized.points().iter().all(|p| !p.x.is_nan()));
    }

    #[test]
    fn test_empty_inputs() {
        let bounds = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(normalize_polygon(&[], Some(&bounds)), Normalization::Empty);
        assert_eq!(normalize_polygon(&square(), None), Normalization::Empty);
    }

    #[test]
    fn test_wider_captured_bounds() {
        let points = square();
        let captured = BoundingBox::new(-10.0, 20.0, -10.0, 20.0);
        let bounds = select_bounds(&points, Some(captured));
        let normalized = normalize_polygon(&points, bounds.as_ref()).into_points();

        let third = 1.0 / 3.0;
        assert!((normalized[0].x - third).abs() < 1e-12);
        assert!((normalized[2].y - 2.0 * third).abs() < 1e-12);
    }

    #[test]
    fn test_select_bounds_falls_back_to_polygon() {
        let points = square();
        let bounds = select_bounds(&points, None).unwrap();
        assert_eq!(bounds, BoundingBox::from_polygon(&points).unwrap());
        assert!(select_bounds(&[], None).is_none());
    }

    #[test]
    fn test_centroid() {
        let points = vec![
            NormalizedPoint::new(0.0, 0.0),
            NormalizedPoint::new(1.0, 0.0),
            NormalizedPoint::new(1.0, 1.0),
            NormalizedPoint::new(0.0, 1.0),
        ];
        assert_eq!(polygon_centroid(&points), Some(NormalizedPoint::CENTER));
        assert_eq!(polygon_centroid(&[]), None);
    }
}
