use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use fastrand::Rng;
use glam::{Vec2, Vec3};
use tracing::info;

use crate::mesh::{MeshError, TerrainMesh, TerrainPlacement};

pub const DEFAULT_GRID_CELLS: usize = 160;
pub const DEFAULT_CELL_SIZE: f32 = 0.25;
pub const DEFAULT_AMPLITUDE: f32 = 1.2;
const JITTER: f32 = 0.05;

/// Seeded rolling-hills height grid.
///
/// Vertices are laid out in the same model space as the terrain asset: the
/// ground spans X/Y and height goes along +Z, so the default placement's
/// -90 degree X rotation stands it upright.
#[derive(Debug, Clone)]
pub struct DeterministicTerrain {
    seed: u64,
    grid_cells: usize,
    cell_size: f32,
    amplitude: f32,
}

impl DeterministicTerrain {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            grid_cells: DEFAULT_GRID_CELLS,
            cell_size: DEFAULT_CELL_SIZE,
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    pub fn with_grid(mut self, grid_cells: usize, cell_size: f32) -> Self {
        self.grid_cells = grid_cells.max(1);
        self.cell_size = cell_size;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Vertices per side.
    pub fn side(&self) -> usize {
        self.grid_cells + 1
    }

    /// Model-space position of grid vertex (`column`, `row`).
    pub fn vertex_at(&self, column: usize, row: usize) -> Vec3 {
        let half = self.grid_cells as f32 * 0.5;
        let x = (column as f32 - half) * self.cell_size;
        let y = (row as f32 - half) * self.cell_size;
        Vec3::new(x, y, self.height_at(column, row))
    }

    pub fn height_at(&self, column: usize, row: usize) -> f32 {
        let half = self.grid_cells as f32 * 0.5;
        let x = (column as f32 - half) * self.cell_size;
        let y = (row as f32 - half) * self.cell_size;

        let ridges = (x * 0.3).sin() * (y * 0.25).cos() + 0.5 * (x * 0.11 + y * 0.17).sin();
        let mut rng = self.rng_for_vertex(column, row);
        let jitter = (rng.f32() - 0.5) * JITTER;

        self.amplitude * ridges + jitter
    }

    pub fn build(&self, placement: TerrainPlacement) -> Result<TerrainMesh, MeshError> {
        let side = self.side();
        let mut positions = Vec::with_capacity(side * side);
        let mut uvs = Vec::with_capacity(side * side);

        for row in 0..side {
            for column in 0..side {
                positions.push(self.vertex_at(column, row));
                uvs.push(Vec2::new(
                    column as f32 / self.grid_cells as f32,
                    row as f32 / self.grid_cells as f32,
                ));
            }
        }

        let mut indices = Vec::with_capacity(self.grid_cells * self.grid_cells * 6);
        for row in 0..self.grid_cells {
            for column in 0..self.grid_cells {
                let top_left = (row * side + column) as u32;
                let top_right = top_left + 1;
                let bottom_left = top_left + side as u32;
                let bottom_right = bottom_left + 1;
                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        info!(
            seed = self.seed,
            vertices = positions.len(),
            "generated terrain"
        );
        Ok(TerrainMesh::new(positions, indices, placement)?.with_uvs(uvs))
    }

    fn rng_for_vertex(&self, column: usize, row: usize) -> Rng {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        column.hash(&mut hasher);
        row.hash(&mut hasher);
        Rng::with_seed(hasher.finish())
    }
}
