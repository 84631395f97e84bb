pub mod camera;
pub mod config;
pub mod direction;
pub mod drone;
pub mod flight;
pub mod input;
pub mod mesh;
pub mod sim;
pub mod terrain;
pub mod worldgen;

pub use camera::{CameraConfig, ClipSpace, look_at};
pub use config::{ConfigError, FlightConfig, SimConfig, TerrainConfig, VetoPolicy};
pub use direction::{Direction, DirectionTable};
pub use drone::DroneState;
pub use flight::{FlightController, StepOutcome};
pub use input::{Action, InputFrame};
pub use mesh::{MeshError, TerrainMesh, TerrainPlacement};
pub use sim::{FrameReport, STEP_ORDER, SimContext, Simulation, load_terrain};
pub use terrain::{Bounds, HeightQuery, Terrain};
pub use worldgen::DeterministicTerrain;
