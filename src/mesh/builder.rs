use serde::Serialize;
use thiserror::Error;

use super::triangulation::{TriangleIndices, triangulate_polygon};
use crate::geometry::NormalizedPoint;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("invalid polygon: need at least 3 vertices, got {0}")]
    InvalidPolygon(usize),
}

/// Flat, texture-mapped mesh handed to the render surface
///
/// One position, UV and normal per input vertex, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshDescription {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<TriangleIndices>,
    pub normals: Vec<[f32; 3]>,
}

impl MeshDescription {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Indices as a flat list, three per triangle
    pub fn flat_indices(&self) -> Vec<u32> {
        self.indices
            .iter()
            .flat_map(|tri| tri.iter().map(|&i| i as u32))
            .collect()
    }

    /// Vertex positions of one triangle, `None` if an index is out of range
    pub fn triangle_vertices(&self, tri: TriangleIndices) -> Option<[[f32; 3]; 3]> {
        let [a, b, c] = tri;
        Some([
            *self.positions.get(a)?,
            *self.positions.get(b)?,
            *self.positions.get(c)?,
        ])
    }

    /// (min, max) corners of the positions, `None` for an empty mesh
    pub fn extent(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(mut lo, mut hi), p| {
                    for axis in 0..3 {
                        lo[axis] = lo[axis].min(p[axis]);
                        hi[axis] = hi[axis].max(p[axis]);
                    }
                    (lo, hi)
                }),
        )
    }
}

/// Build a polygon-shaped mesh with UVs taken straight from the normalized points
///
/// Each point (x, y) lands at `((x - 0.5) * scale, (y - 0.5) * scale * aspect_ratio, 0)`,
/// so the mesh is centered on the origin and keeps the texture's proportions.
/// UVs are not flipped: normalized y runs south to north, matching a
/// bottom-left texture origin.
///
/// # Arguments
/// * `points` - Normalized polygon, at least 3 vertices
/// * `aspect_ratio` - Texture height / width
/// * `scale` - Width of the full [0, 1] range in world units
pub fn build_polygon_mesh(
    points: &[NormalizedPoint],
    aspect_ratio: f32,
    scale: f32,
) -> Result<MeshDescription, MeshError> {
    if points.len() < 3 {
        return Err(MeshError::InvalidPolygon(points.len()));
    }

    let scale = scale as f64;
    let height_scale = scale * aspect_ratio as f64;

    let positions: Vec<[f32; 3]> = points
        .iter()
        .map(|p| {
            [
                ((p.x - 0.5) * scale) as f32,
                ((p.y - 0.5) * height_scale) as f32,
                0.0,
            ]
        })
        .collect();

    let uvs: Vec<[f32; 2]> = points.iter().map(|p| [p.x as f32, p.y as f32]).collect();

    let indices = triangulate_polygon(points);
    let normals = compute_vertex_normals(&positions, &indices);

    Ok(MeshDescription {
        positions,
        uvs,
        indices,
        normals,
    })
}

/// A centered flat rectangle used when there is no usable polygon
pub fn build_placeholder_plane(width: f32, height: f32) -> MeshDescription {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let positions = vec![
        [-hw, -hh, 0.0],
        [hw, -hh, 0.0],
        [hw, hh, 0.0],
        [-hw, hh, 0.0],
    ];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let indices = vec![[0, 1, 2], [0, 2, 3]];
    let normals = compute_vertex_normals(&positions, &indices);

    MeshDescription {
        positions,
        uvs,
        indices,
        normals,
    }
}

/// Smooth vertex normals from the triangulated surface
///
/// Face normals are summed unnormalized, which weights them by area.
/// Vertices that no triangle touches point up.
fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[TriangleIndices]) -> Vec<[f32; 3]> {
    let mut sums = vec![[0.0f32; 3]; positions.len()];

    for tri in indices {
        let face = face_cross(positions[tri[0]], positions[tri[1]], positions[tri[2]]);
        for &i in tri {
            for axis in 0..3 {
                sums[i][axis] += face[axis];
            }
        }
    }

    sums.into_iter().map(normalize_or_up).collect()
}

/// Unit normal of a triangle, +Z for degenerate triangles
pub(crate) fn face_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    normalize_or_up(face_cross(v0, v1, v2))
}

/// Cross product of the two edge vectors from `v0`
fn face_cross(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let u = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let v = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn normalize_or_up(n: [f32; 3]) -> [f32; 3] {
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-10 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}
