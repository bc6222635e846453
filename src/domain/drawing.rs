//! Polygon drawing session
//!
//! Taps on the map grow an in-progress polygon. The session is an explicit
//! state machine so the geometry pipeline only ever receives a finished,
//! cloned snapshot and never the buffer that is still being appended to.

use thiserror::Error;
use tracing::debug;

use super::{GeoPoint, GeoPolygon};

#[derive(Debug, Error, PartialEq)]
pub enum DrawingError {
    #[error("not drawing: call start() before adding points")]
    NotDrawing,
    #[error("already drawing a polygon")]
    AlreadyDrawing,
    #[error("polygon needs at least 3 points, has {0}")]
    TooFewPoints(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    Idle,
    Drawing { points: Vec<GeoPoint> },
    Finished { polygon: GeoPolygon },
}

/// A finished polygon kept for display on the map
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPolygon {
    pub id: u64,
    pub polygon: GeoPolygon,
}

#[derive(Debug)]
pub struct DrawingSession {
    state: DrawingState,
    saved: Vec<SavedPolygon>,
    next_id: u64,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSession {
    pub fn new() -> Self {
        Self {
            state: DrawingState::Idle,
            saved: Vec::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing { .. })
    }

    /// Begin a new polygon. Allowed from `Idle` and `Finished`.
    pub fn start(&mut self) -> Result<(), DrawingError> {
        if self.is_drawing() {
            return Err(DrawingError::AlreadyDrawing);
        }
        self.state = DrawingState::Drawing { points: Vec::new() };
        Ok(())
    }

    /// Append a tapped point; returns the new point count
    pub fn add_point(&mut self, point: GeoPoint) -> Result<usize, DrawingError> {
        match &mut self.state {
            DrawingState::Drawing { points } => {
                points.push(point);
                debug!(count = points.len(), "added polygon point");
                Ok(points.len())
            }
            _ => Err(DrawingError::NotDrawing),
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.state {
            DrawingState::Idle => 0,
            DrawingState::Drawing { points } => points.len(),
            DrawingState::Finished { polygon } => polygon.len(),
        }
    }

    /// Points to render as an outline preview, once there are at least two
    pub fn preview(&self) -> Option<&[GeoPoint]> {
        match &self.state {
            DrawingState::Drawing { points } if points.len() >= 2 => Some(points),
            _ => None,
        }
    }

    /// Discard the in-progress polygon
    pub fn cancel(&mut self) {
        self.state = DrawingState::Idle;
    }

    /// Close the polygon and hand back an immutable copy of it.
    ///
    /// With fewer than 3 points the session stays in `Drawing`.
    pub fn finish(&mut self) -> Result<GeoPolygon, DrawingError> {
        let points = match &self.state {
            DrawingState::Drawing { points } => points,
            _ => return Err(DrawingError::NotDrawing),
        };
        if points.len() < 3 {
            return Err(DrawingError::TooFewPoints(points.len()));
        }

        let polygon = GeoPolygon::new(points.clone());
        self.saved.push(SavedPolygon {
            id: self.next_id,
            polygon: polygon.clone(),
        });
        self.next_id += 1;
        self.state = DrawingState::Finished {
            polygon: polygon.clone(),
        };
        Ok(polygon)
    }

    pub fn saved_polygons(&self) -> &[SavedPolygon] {
        &self.saved
    }
}
