use std::io::{self, Write};

use dronesim_core::TerrainMesh;

/// Writes the mesh in model space as Wavefront OBJ. Placement is not baked in;
/// the loader applies it again from the terrain config.
pub fn write_obj<W: Write>(mesh: &TerrainMesh, mut out: W) -> io::Result<()> {
    writeln!(out, "# dronesim terrain")?;
    writeln!(out, "o terrain")?;

    for p in mesh.positions() {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }

    // Mesh UVs are top-left origin, OBJ texture coordinates bottom-left.
    let has_uvs = mesh.uvs().len() == mesh.vertex_count();
    if has_uvs {
        for uv in mesh.uvs() {
            writeln!(out, "vt {} {}", uv.x, 1.0 - uv.y)?;
        }
    }

    // OBJ indices are 1-based.
    for triangle in mesh.indices().chunks_exact(3) {
        let [a, b, c] = [triangle[0] + 1, triangle[1] + 1, triangle[2] + 1];
        if has_uvs {
            writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
        } else {
            writeln!(out, "f {a} {b} {c}")?;
        }
    }

    out.flush()
}
