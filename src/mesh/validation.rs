//! Mesh validation
//!
//! Checks a built mesh description against the guarantees the render surface
//! relies on:
//! - One UV and one normal per position
//! - Triangle indices in range and pairwise distinct
//! - Finite positions, UVs inside the unit square
//! - Degenerate (zero-area) triangles

use super::MeshDescription;
use super::triangulation::TriangleIndices;

/// Result of mesh validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Total number of triangles validated
    pub total: usize,
    /// Triangles referencing a vertex that does not exist
    pub out_of_range: usize,
    /// Triangles using the same vertex twice
    pub repeated_index: usize,
    /// Number of degenerate triangles (zero or near-zero area)
    pub degenerate: usize,
    /// Vertices with NaN/Inf position or UV
    pub invalid_coords: usize,
    /// UVs outside [0, 1]
    pub uv_out_of_range: usize,
    /// Attribute arrays whose length differs from the position count
    pub length_mismatch: bool,
    /// Warning messages for issues found
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Check if the mesh can be handed to a renderer without indexing errors
    pub fn is_valid(&self) -> bool {
        self.out_of_range == 0
            && self.repeated_index == 0
            && self.invalid_coords == 0
            && !self.length_mismatch
    }

    /// Check if the mesh has any issues at all
    pub fn has_issues(&self) -> bool {
        !self.is_valid() || self.degenerate > 0 || self.uv_out_of_range > 0
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} triangles, no issues", self.total)
        } else {
            format!(
                "Mesh issues: {} total, {} out of range, {} repeated index, {} degenerate, {} invalid coords, {} UVs outside unit square",
                self.total,
                self.out_of_range,
                self.repeated_index,
                self.degenerate,
                self.invalid_coords,
                self.uv_out_of_range
            )
        }
    }
}

/// Minimum area threshold for non-degenerate triangles (world units squared)
const MIN_TRIANGLE_AREA: f32 = 1e-10;

/// Validate a mesh and return a detailed report
pub fn validate_mesh(mesh: &MeshDescription) -> ValidationResult {
    let vertex_count = mesh.positions.len();
    let mut result = ValidationResult {
        total: mesh.indices.len(),
        ..Default::default()
    };

    if mesh.uvs.len() != vertex_count || mesh.normals.len() != vertex_count {
        result.length_mismatch = true;
        result.warnings.push(format!(
            "{} positions but {} uvs and {} normals",
            vertex_count,
            mesh.uvs.len(),
            mesh.normals.len()
        ));
    }

    for (i, p) in mesh.positions.iter().enumerate() {
        let uv_finite = mesh
            .uvs
            .get(i)
            .is_none_or(|uv| uv.iter().all(|c| c.is_finite()));
        if !p.iter().all(|c| c.is_finite()) || !uv_finite {
            result.invalid_coords += 1;
            result
                .warnings
                .push(format!("Vertex {} has NaN/Inf coordinates", i));
        }
    }

    result.uv_out_of_range = mesh
        .uvs
        .iter()
        .filter(|uv| uv.iter().any(|c| !(0.0..=1.0).contains(c)))
        .count();

    for (i, &tri) in mesh.indices.iter().enumerate() {
        if tri.iter().any(|&idx| idx >= vertex_count) {
            result.out_of_range += 1;
            result
                .warnings
                .push(format!("Triangle {} references a missing vertex: {:?}", i, tri));
            continue;
        }

        if has_repeated_index(tri) {
            result.repeated_index += 1;
            result
                .warnings
                .push(format!("Triangle {} repeats a vertex: {:?}", i, tri));
            continue;
        }

        if mesh
            .triangle_vertices(tri)
            .is_some_and(|v| triangle_area(&v) < MIN_TRIANGLE_AREA)
        {
            result.degenerate += 1;
        }
    }

    if result.degenerate > 0 {
        result
            .warnings
            .push(format!("{} degenerate triangles detected", result.degenerate));
    }
    if result.uv_out_of_range > 0 {
        result.warnings.push(format!(
            "{} UVs fall outside the snapshot",
            result.uv_out_of_range
        ));
    }

    result
}

fn has_repeated_index(tri: TriangleIndices) -> bool {
    tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2]
}

/// Calculate the area of a triangle from its vertices
fn triangle_area(vertices: &[[f32; 3]; 3]) -> f32 {
    let v0 = vertices[0];
    let v1 = vertices[1];
    let v2 = vertices[2];

    let edge_a = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let edge_b = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cx = edge_a[1] * edge_b[2] - edge_a[2] * edge_b[1];
    let cy = edge_a[2] * edge_b[0] - edge_a[0] * edge_b[2];
    let cz = edge_a[0] * edge_b[1] - edge_a[1] * edge_b[0];

    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NormalizedPoint;
    use crate::mesh::build_polygon_mesh;

    fn square_mesh() -> MeshDescription {
        let points = vec![
            NormalizedPoint::new(0.0, 0.0),
            NormalizedPoint::new(1.0, 0.0),
            NormalizedPoint::new(1.0, 1.0),
            NormalizedPoint::new(0.0, 1.0),
        ];
        build_polygon_mesh(&points, 1.0, 10.0).unwrap()
    }

    #[test]
    fn test_valid_mesh() {
        let result = validate_mesh(&square_mesh());

        assert_eq!(result.total, 2);
        assert!(result.is_valid());
        assert!(!result.has_issues());
        assert!(result.summary().starts_with("Mesh valid"));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut mesh = square_mesh();
        mesh.indices.push([0, 1, 7]);

        let result = validate_mesh(&mesh);
        assert_eq!(result.out_of_range, 1);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_repeated_index() {
        let mut mesh = square_mesh();
        mesh.indices.push([2, 2, 3]);

        let result = validate_mesh(&mesh);
        assert_eq!(result.repeated_index, 1);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_degenerate_triangle() {
        let points = vec![NormalizedPoint::CENTER; 3];
        let mesh = build_polygon_mesh(&points, 1.0, 10.0).unwrap();

        let result = validate_mesh(&mesh);
        assert_eq!(result.degenerate, 1);
        assert!(result.is_valid());
        assert!(result.has_issues());
    }

    #[test]
    fn test_invalid_coords() {
        let mut mesh = square_mesh();
        mesh.positions[1][0] = f32::NAN;

        let result = validate_mesh(&mesh);
        assert_eq!(result.invalid_coords, 1);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_uv_outside_unit_square() {
        let mut mesh = square_mesh();
        mesh.uvs[2] = [1.2, 0.5];

        let result = validate_mesh(&mesh);
        assert_eq!(result.uv_out_of_range, 1);
        assert!(result.is_valid());
        assert!(result.has_issues());
    }

    #[test]
    fn test_length_mismatch() {
        let mut mesh = square_mesh();
        mesh.uvs.pop();

        let result = validate_mesh(&mesh);
        assert!(result.length_mismatch);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_triangle_area() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let area = triangle_area(&vertices);
        assert!((area - 0.5).abs() < 0.001);
    }
}
