pub mod bounds;
pub mod normalize;

pub use bounds::{BoundingBox, VisibleRegion};
pub use normalize::{
    NormalizedPoint, Normalization, normalize_polygon, polygon_centroid, select_bounds,
};
