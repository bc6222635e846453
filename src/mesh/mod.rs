pub mod builder;
pub mod json;
pub mod obj;
pub mod stl;
pub mod triangulation;
pub mod validation;

pub use builder::{MeshDescription, MeshError, build_placeholder_plane, build_polygon_mesh};
pub use json::write_mesh_json;
pub use obj::write_obj;
pub use stl::{estimate_stl_size, write_stl};
pub use triangulation::{TriangleIndices, Winding, triangulate_polygon, winding};
pub use validation::{ValidationResult, validate_mesh};
