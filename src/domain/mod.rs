pub mod drawing;
pub mod point;

pub use drawing::{DrawingError, DrawingSession, DrawingState, SavedPolygon};
pub use point::{GeoPoint, GeoPolygon};
