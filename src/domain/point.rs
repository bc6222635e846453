use serde::{Deserialize, Serialize};

/// A geographic coordinate in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Build from a `(lat, lon)` pair
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// A polygon as drawn on the map, in drawing order
///
/// The ring is implicitly closed: the last point connects back to the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoPolygon {
    pub points: Vec<GeoPoint>,
}

impl GeoPolygon {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// At least three points are needed to enclose an area
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    /// Two points are enough to preview the outline as a line
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl FromIterator<GeoPoint> for GeoPolygon {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
