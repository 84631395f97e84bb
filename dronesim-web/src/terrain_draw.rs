use dronesim_core::TerrainMesh;
use macroquad::prelude::*;

/// `Mesh` indices are u16, so bigger terrains are split into batches of whole triangles.
pub const MAX_BATCH_VERTICES: usize = u16::MAX as usize - 2;

const LOW_COLOR: Color = Color::new(0.22, 0.36, 0.18, 1.0);
const MID_COLOR: Color = Color::new(0.56, 0.39, 0.25, 1.0);
const HIGH_COLOR: Color = Color::new(0.85, 0.85, 0.82, 1.0);

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

/// Vertex tint for a normalized height in `[0, 1]`.
pub fn height_tint(normalized: f32) -> Color {
    if normalized < 0.5 {
        lerp_color(LOW_COLOR, MID_COLOR, normalized * 2.0)
    } else {
        lerp_color(MID_COLOR, HIGH_COLOR, (normalized - 0.5) * 2.0)
    }
}

/// World-space terrain batches. The placement is baked into the vertices, so
/// they are drawn under the plain camera transform.
pub struct TerrainModel {
    batches: Vec<Mesh>,
}

impl TerrainModel {
    pub fn build(mesh: &TerrainMesh, texture: Option<Texture2D>) -> Self {
        let world = mesh.world_matrix();
        let positions: Vec<Vec3> = mesh
            .positions()
            .iter()
            .map(|&p| world.transform_point3(p))
            .collect();

        let (min_y, max_y) = positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let span = (max_y - min_y).max(f32::EPSILON);

        let mut batches = Vec::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for triangle in mesh.indices().chunks_exact(3) {
            if vertices.len() + 3 > MAX_BATCH_VERTICES {
                batches.push(Mesh {
                    vertices: std::mem::take(&mut vertices),
                    indices: std::mem::take(&mut indices),
                    texture: texture.clone(),
                });
            }

            for &index in triangle {
                let index = index as usize;
                let position = positions[index];
                let uv = mesh.uvs().get(index).copied().unwrap_or(Vec2::ZERO);
                let color = if texture.is_some() {
                    WHITE
                } else {
                    height_tint((position.y - min_y) / span)
                };
                indices.push(vertices.len() as u16);
                vertices.push(Vertex::new2(position, uv, color));
            }
        }

        if !vertices.is_empty() {
            batches.push(Mesh {
                vertices,
                indices,
                texture,
            });
        }

        Self { batches }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn draw(&self) {
        for batch in &self.batches {
            draw_mesh(batch);
        }
    }
}
