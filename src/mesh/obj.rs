use super::MeshDescription;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Write a mesh as Wavefront OBJ with positions, UVs and normals
///
/// When `texture` is given a sibling `.mtl` file is written that maps the
/// image onto the mesh, so the result opens textured in common viewers.
/// Viewers resolve `map_Kd` against the `.mtl` file's directory, so the
/// texture is written as an absolute path.
pub fn write_obj(path: &Path, mesh: &MeshDescription, texture: Option<&Path>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_obj_to(&mut writer, mesh, texture.map(|_| material_file_name(path)).as_deref())?;
    writer.flush()?;

    if let Some(texture) = texture {
        let mtl_path = path.with_extension("mtl");
        let mut mtl = File::create(&mtl_path)
            .with_context(|| format!("Failed to create MTL file: {}", mtl_path.display()))?;
        writeln!(mtl, "newmtl snapshot")?;
        writeln!(mtl, "Kd 1.0 1.0 1.0")?;
        writeln!(mtl, "map_Kd {}", texture_reference(texture).display())?;
    }

    Ok(())
}

fn texture_reference(texture: &Path) -> PathBuf {
    std::fs::canonicalize(texture).unwrap_or_else(|e| {
        warn!(texture = %texture.display(), error = %e, "cannot resolve texture path");
        texture.to_path_buf()
    })
}

fn material_file_name(obj_path: &Path) -> String {
    obj_path
        .with_extension("mtl")
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh.mtl".to_string())
}

/// Serialize a mesh as OBJ text. Face indices are 1-based `v/vt/vn` triples.
pub fn write_obj_to<W: Write>(
    writer: &mut W,
    mesh: &MeshDescription,
    material_lib: Option<&str>,
) -> Result<()> {
    writeln!(writer, "# mapclip3d")?;
    if let Some(lib) = material_lib {
        writeln!(writer, "mtllib {}", lib)?;
        writeln!(writer, "usemtl snapshot")?;
    }

    for p in &mesh.positions {
        writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for uv in &mesh.uvs {
        writeln!(writer, "vt {} {}", uv[0], uv[1])?;
    }
    for n in &mesh.normals {
        writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    for tri in &mesh.indices {
        let [a, b, c] = tri.map(|i| i + 1);
        writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }

    Ok(())
}
