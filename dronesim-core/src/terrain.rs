//! Nearest-vertex terrain height lookup.
//!
//! The search is a heuristic: it walks a bounded window of the vertex list
//! around the previous hit and returns the first vertex whose x/z lies within
//! `vertex_offset` of the query. It is not an exact nearest-neighbour query,
//! and a drone that travels further than the window per frame can miss.

use crate::config::TerrainConfig;
use crate::mesh::TerrainMesh;
use glam::Vec3;
use std::sync::Arc;

/// Terrain lookup capability used by the flight controller.
pub trait HeightQuery {
    /// World-space terrain point under `(x, z)`, or `None` when there is no data.
    fn nearest_height(&mut self, x: f32, z: f32) -> Option<Vec3>;
}

impl<F> HeightQuery for F
where
    F: FnMut(f32, f32) -> Option<Vec3>,
{
    fn nearest_height(&mut self, x: f32, z: f32) -> Option<Vec3> {
        self(x, z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct Terrain {
    mesh: Arc<TerrainMesh>,
    world_vertices: Vec<Vec3>,
    vertex_offset: f32,
    search_window: usize,
    last_lookup_index: usize,
}

impl Terrain {
    pub fn new(mesh: Arc<TerrainMesh>, config: &TerrainConfig) -> Self {
        let world = mesh.world_matrix();
        let world_vertices = mesh
            .positions()
            .iter()
            .map(|&p| world.transform_point3(p))
            .collect();

        Self {
            mesh,
            world_vertices,
            vertex_offset: config.vertex_offset,
            search_window: config.search_window.max(1),
            last_lookup_index: 0,
        }
    }

    pub fn mesh(&self) -> &Arc<TerrainMesh> {
        &self.mesh
    }

    pub fn world_vertices(&self) -> &[Vec3] {
        &self.world_vertices
    }

    /// Index of the last successful match.
    pub fn cursor(&self) -> usize {
        self.last_lookup_index
    }

    pub fn bounds(&self) -> Bounds {
        let init = Bounds {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        };
        self.world_vertices.iter().fold(init, |b, &v| Bounds {
            min: b.min.min(v),
            max: b.max.max(v),
        })
    }

    pub fn nearest_height(&mut self, x: f32, z: f32) -> Option<Vec3> {
        let len = self.world_vertices.len();
        if len == 0 {
            return None;
        }
        if self.last_lookup_index >= len {
            self.last_lookup_index = 0;
        }

        let start = self.last_lookup_index;
        // A cold cursor scans the whole mesh once.
        let upper = if start == 0 {
            len
        } else {
            start.saturating_add(self.search_window).min(len)
        };
        let lower = start.saturating_sub(self.search_window);

        let hit = (start..upper)
            .find(|&i| self.matches(i, x, z))
            .or_else(|| ((lower + 1)..=start).rev().find(|&i| self.matches(i, x, z)));

        hit.map(|i| {
            self.last_lookup_index = i;
            self.world_vertices[i]
        })
    }

    fn matches(&self, index: usize, x: f32, z: f32) -> bool {
        let vertex = self.world_vertices[index];
        (vertex.x - x).abs() < self.vertex_offset && (vertex.z - z).abs() < self.vertex_offset
    }
}

impl HeightQuery for Terrain {
    fn nearest_height(&mut self, x: f32, z: f32) -> Option<Vec3> {
        Terrain::nearest_height(self, x, z)
    }
}
