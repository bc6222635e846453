use super::MeshDescription;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Dump the mesh buffers as JSON for a render surface to load directly
pub fn write_mesh_json(path: &Path, mesh: &MeshDescription) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create mesh JSON file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, mesh).context("Failed to serialize mesh")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_placeholder_plane;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_mesh_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.json");
        let mesh = build_placeholder_plane(2.0, 4.0);

        write_mesh_json(&path, &mesh).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["positions"].as_array().unwrap().len(), 4);
        assert_eq!(value["uvs"].as_array().unwrap().len(), 4);
        assert_eq!(value["normals"].as_array().unwrap().len(), 4);
        assert_eq!(value["indices"][0], serde_json::json!([0, 1, 2]));
        assert_eq!(value["positions"][2], serde_json::json!([1.0, 2.0, 0.0]));
    }
}
