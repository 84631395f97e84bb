use crate::camera::{CameraConfig, ClipSpace, look_at};
use crate::config::{SimConfig, TerrainConfig};
use crate::direction::Direction;
use crate::flight::{FlightController, StepOutcome};
use crate::input::{Action, InputFrame};
use crate::mesh::{MeshError, TerrainMesh};
use crate::terrain::{Bounds, Terrain};
use crate::worldgen::DeterministicTerrain;
use glam::{Mat4, Vec3};
use std::sync::Arc;

/// Order the directions are updated in each frame. The terrain cursor is
/// shared, so this also decides which step is checked first.
pub const STEP_ORDER: [Direction; 6] = [
    Direction::Left,
    Direction::Back,
    Direction::Right,
    Direction::Forward,
    Direction::Up,
    Direction::Down,
];

/// Per-run state owned by the frame loop and handed to every update call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    pub elapsed_time: f32,
    pub camera_position: Vec3,
    pub tick: u64,
}

impl SimContext {
    pub fn new(camera_position: Vec3) -> Self {
        Self {
            elapsed_time: 0.0,
            camera_position,
            tick: 0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed_time += dt;
        self.tick += 1;
    }
}

/// How many direction updates translated or were vetoed during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub moved: usize,
    pub vetoed: usize,
}

impl FrameReport {
    fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Idle => {}
            StepOutcome::Moved => self.moved += 1,
            StepOutcome::Vetoed => self.vetoed += 1,
        }
    }
}

/// Loads the configured OBJ, or generates terrain from the seed when none is set.
pub fn load_terrain(config: &TerrainConfig) -> Result<Terrain, MeshError> {
    let mesh = match &config.mesh_path {
        Some(path) => TerrainMesh::load_obj(path, config.placement.clone())?,
        None => DeterministicTerrain::new(config.seed).build(config.placement.clone())?,
    };
    Ok(Terrain::new(Arc::new(mesh), config))
}

#[derive(Debug)]
pub struct Simulation {
    pub context: SimContext,
    controller: FlightController,
    camera: CameraConfig,
    terrain_mesh: Option<Arc<TerrainMesh>>,
    terrain_bounds: Option<Bounds>,
}

impl Simulation {
    pub fn new(config: &SimConfig, terrain: Option<Terrain>) -> Self {
        let mut controller = FlightController::new(config.flight.clone());
        let context = controller.spawn_context();

        let (terrain_mesh, terrain_bounds) = match terrain {
            Some(terrain) => {
                let mesh = Arc::clone(terrain.mesh());
                let bounds = terrain.bounds();
                controller.set_height_query(terrain);
                (Some(mesh), Some(bounds))
            }
            None => (None, None),
        };

        Self {
            context,
            controller,
            camera: config.camera.clone(),
            terrain_mesh,
            terrain_bounds,
        }
    }

    /// One frame: every direction either thrusts or coasts, yaw keys turn the
    /// view, and the fans spool up while anything is held.
    pub fn step(&mut self, input: &InputFrame, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        let ctx = &mut self.context;

        for direction in STEP_ORDER {
            let outcome = if input.moving(direction) {
                self.controller.move_in(direction, dt, ctx)
            } else {
                self.controller.stop(direction, dt, ctx)
            };
            report.record(outcome);
        }

        if input.is_pressed(Action::YawRight) {
            self.controller.rotate_view(dt, -1.0, ctx);
        }
        if input.is_pressed(Action::YawLeft) {
            self.controller.rotate_view(dt, 1.0, ctx);
        }

        if input.any_pressed() {
            self.controller.activate_fans();
        } else {
            self.controller.deactivate_fans();
        }
        self.controller.spin_fans();

        ctx.advance(dt);
        report
    }

    pub fn respawn(&mut self) {
        self.controller.respawn(&mut self.context);
    }

    pub fn controller(&self) -> &FlightController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FlightController {
        &mut self.controller
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn terrain_mesh(&self) -> Option<&Arc<TerrainMesh>> {
        self.terrain_mesh.as_ref()
    }

    pub fn terrain_bounds(&self) -> Option<Bounds> {
        self.terrain_bounds
    }

    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.context.camera_position, self.controller.position())
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        self.camera.projection(aspect)
    }

    /// Projection × view for a renderer using the given clip-space convention.
    pub fn view_projection(&self, aspect: f32, clip: ClipSpace) -> Mat4 {
        self.camera.projection_for(aspect, clip) * self.view_matrix()
    }

    /// Sky box placement around the drone.
    pub fn skybox_transform(&self) -> Mat4 {
        self.camera.skybox_transform(self.controller.position())
    }
}
