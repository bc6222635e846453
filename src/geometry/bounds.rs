use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

/// A map region as reported by a map surface: center plus full spans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRegion {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Axis-aligned bounding box in geographic degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// Midpoint of the extrema (not the polygon centroid)
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl BoundingBox {
    /// Create bounds from explicit extrema
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
            center: GeoPoint::new((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0),
            latitude_delta: max_lat - min_lat,
            longitude_delta: max_lng - min_lng,
        }
    }

    /// Create bounds from a set of points
    ///
    /// Returns `None` for an empty slice; callers treat that as "no data".
    pub fn from_polygon(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self::new(min_lat, max_lat, min_lng, max_lng))
    }

    /// Bounds of the region a map surface actually displayed
    pub fn from_region(region: &VisibleRegion) -> Self {
        let half_lat = region.latitude_delta / 2.0;
        let half_lng = region.longitude_delta / 2.0;
        Self {
            min_lat: region.center.latitude - half_lat,
            max_lat: region.center.latitude + half_lat,
            min_lng: region.center.longitude - half_lng,
            max_lng: region.center.longitude + half_lng,
            center: region.center,
            latitude_delta: region.latitude_delta,
            longitude_delta: region.longitude_delta,
        }
    }

    /// The region a capture surface should be asked to display
    pub fn region(&self) -> VisibleRegion {
        VisibleRegion {
            center: self.center,
            latitude_delta: self.latitude_delta,
            longitude_delta: self.longitude_delta,
        }
    }

    /// True when the box has zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.max_lat - self.min_lat == 0.0 || self.max_lng - self.min_lng == 0.0
    }

    /// Width over height in degrees, used to size the capture view
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(self.longitude_delta / self.latitude_delta)
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
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
    fn test_bounds_from_square() {
        let bounds = BoundingBox::from_polygon(&square()).unwrap();

        assert_eq!(bounds.min_lat, 0.0);
        assert_eq!(bounds.max_lat, 10.0);
        assert_eq!(bounds.min_lng, 0.0);
        assert_eq!(bounds.max_lng, 10.0);
        assert_eq!(bounds.center, GeoPoint::new(5.0, 5.0));
        assert_eq!(bounds.latitude_delta, 10.0);
        assert_eq!(bounds.longitude_delta, 10.0);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(BoundingBox::from_polygon(&[]).is_none());
    }

    #[test]
    fn test_center_is_midpoint_not_centroid() {
        // Three points crowded at the south edge pull the centroid down, not the center
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.1, 0.5),
            GeoPoint::new(4.0, 0.5),
        ];
        let bounds = BoundingBox::from_polygon(&points).unwrap();
        assert_eq!(bounds.center.latitude, 2.0);
        assert_eq!(bounds.center.longitude, 0.5);
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let bounds = BoundingBox::from_polygon(&[GeoPoint::new(51.5, -0.12)]).unwrap();
        assert!(bounds.is_degenerate());
        assert!(bounds.aspect_ratio().is_none());
    }

    #[test]
    fn test_region_round_trip() {
        let region = VisibleRegion {
            center: GeoPoint::new(54.5, -2.0),
            latitude_delta: 2.0,
            longitude_delta: 4.0,
        };
        let bounds = BoundingBox::from_region(&region);

        assert_eq!(bounds.min_lat, 53.5);
        assert_eq!(bounds.max_lng, 0.0);
        assert_eq!(bounds.aspect_ratio(), Some(2.0));
        assert_eq!(bounds.region(), region);
    }

    #[test]
    fn test_contains() {
        let bounds = BoundingBox::from_polygon(&square()).unwrap();
        assert!(bounds.contains(&GeoPoint::new(5.0, 5.0)));
        assert!(bounds.contains(&GeoPoint::new(10.0, 0.0)));
        assert!(!bounds.contains(&GeoPoint::new(10.5, 0.0)));
    }
}
