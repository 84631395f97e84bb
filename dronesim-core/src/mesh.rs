use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to load mesh: {0}")]
    Load(#[from] tobj::LoadError),
    #[error("mesh has no vertices")]
    Empty,
    #[error("index {index} out of range for {vertex_count} vertices")]
    BadIndex { index: u32, vertex_count: usize },
}

/// Model-to-world placement of the terrain: translate × rotate × scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainPlacement {
    pub position: Vec3,
    /// Euler angles applied in X, Y, Z order.
    pub rotation_degrees: Vec3,
    pub scale: f32,
}

impl Default for TerrainPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::new(-20.0, -10.0, 30.0),
            rotation_degrees: Vec3::new(-90.0, 0.0, 0.0),
            scale: 5.0,
        }
    }
}

impl TerrainPlacement {
    pub fn world_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_degrees.x.to_radians(),
            self.rotation_degrees.y.to_radians(),
            self.rotation_degrees.z.to_radians(),
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
pub struct TerrainMesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    uvs: Vec<Vec2>,
    placement: TerrainPlacement,
}

impl TerrainMesh {
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        placement: TerrainPlacement,
    ) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::BadIndex {
                index,
                vertex_count: positions.len(),
            });
        }

        let uvs = vec![Vec2::ZERO; positions.len()];
        Ok(Self {
            positions,
            indices,
            uvs,
            placement,
        })
    }

    /// Replaces texture coordinates; ignored unless there is one per vertex.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        if uvs.len() == self.positions.len() {
            self.uvs = uvs;
        }
        self
    }

    /// Loads every model of a Wavefront OBJ into a single vertex list.
    pub fn load_obj(path: impl AsRef<Path>, placement: TerrainPlacement) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(path, &load_options())?;
        let mesh = Self::from_models(&models, placement)?;
        info!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            triangles = mesh.indices.len() / 3,
            "loaded terrain mesh"
        );
        Ok(mesh)
    }

    /// Parses OBJ text already in memory, for hosts that fetch assets
    /// without a filesystem. Material libraries are ignored.
    pub fn from_obj_str(obj: &str, placement: TerrainPlacement) -> Result<Self, MeshError> {
        let mut reader = BufReader::new(obj.as_bytes());
        let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        let mesh = Self::from_models(&models, placement)?;
        info!(
            bytes = obj.len(),
            vertices = mesh.vertex_count(),
            triangles = mesh.indices.len() / 3,
            "parsed terrain mesh"
        );
        Ok(mesh)
    }

    fn from_models(models: &[tobj::Model], placement: TerrainPlacement) -> Result<Self, MeshError> {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut uvs = Vec::new();

        for model in models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );
            if mesh.texcoords.len() / 2 == vertex_count {
                uvs.extend(
                    mesh.texcoords
                        .chunks_exact(2)
                        .map(|t| Vec2::new(t[0], 1.0 - t[1])),
                );
            } else {
                uvs.extend(std::iter::repeat(Vec2::ZERO).take(vertex_count));
            }
            indices.extend(mesh.indices.iter().map(|i| i + base));
        }

        Ok(Self::new(positions, indices, placement)?.with_uvs(uvs))
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn placement(&self) -> &TerrainPlacement {
        &self.placement
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.placement.world_matrix()
    }
}
