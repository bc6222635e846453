use super::MeshDescription;
use super::builder::face_normal;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Write a mesh to a binary STL file
///
/// STL has no UVs, so this is only useful for checking the clipped shape.
/// Triangles that reference a missing vertex are skipped.
///
/// Binary STL format:
/// - 80 byte header
/// - 4 byte u32 triangle count (little endian)
/// - For each triangle:
///   - 3 x f32 normal (12 bytes)
///   - 3 x 3 x f32 vertices (36 bytes)
///   - 2 byte attribute (usually 0)
pub fn write_stl(path: &Path, mesh: &MeshDescription) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut header = [b' '; 80];
    let title = b"mapclip3d - clipped map polygon";
    header[..title.len()].copy_from_slice(title);
    writer.write_all(&header)?;

    let triangles: Vec<[[f32; 3]; 3]> = mesh
        .indices
        .iter()
        .filter_map(|&tri| mesh.triangle_vertices(tri))
        .collect();
    let skipped = mesh.indices.len() - triangles.len();
    if skipped > 0 {
        warn!(skipped, "skipping triangles with out-of-range indices");
    }

    let count = triangles.len() as u32;
    writer.write_all(&count.to_le_bytes())?;

    for vertices in triangles {
        let normal = face_normal(vertices[0], vertices[1], vertices[2]);

        for n in normal {
            writer.write_all(&n.to_le_bytes())?;
        }

        for vertex in vertices {
            for coord in vertex {
                writer.write_all(&coord.to_le_bytes())?;
            }
        }

        writer.write_all(&[0u8, 0u8])?;
    }

    writer.flush()?;

    Ok(())
}

/// Get the file size of an STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    // 80 (header) + 4 (count) + triangles * (12 normal + 36 vertices + 2 attribute)
    80 + 4 + triangle_count * 50
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_placeholder_plane;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_stl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.stl");

        let mesh = build_placeholder_plane(10.0, 10.0);
        write_stl(&path, &mesh).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), estimate_stl_size(2));
        assert!(bytes.starts_with(b"mapclip3d"));
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 2);
    }

    #[test]
    fn test_write_stl_skips_broken_triangles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.stl");

        let mut mesh = build_placeholder_plane(10.0, 10.0);
        mesh.indices.push([0, 2, 9]);
        write_stl(&path, &mesh).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), estimate_stl_size(2));
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 2);
    }

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_stl_size(0), 84);
        assert_eq!(estimate_stl_size(1), 134);
    }
}
