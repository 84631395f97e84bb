use dronesim_core::{
    Action, ClipSpace, Direction, InputFrame, SimConfig, Simulation, Terrain, TerrainMesh,
    load_terrain,
};
#[cfg(target_arch = "wasm32")]
use macroquad::miniquad;
use macroquad::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{info, warn};

use crate::drone::{DroneDrawConfig, draw_drone};
use crate::sky::SkyBox;
use crate::terrain_draw::TerrainModel;

mod drone;
mod sky;
mod terrain_draw;

const CONFIG_PATH: &str = "assets/dronesim.json";
const FIXED_STEP_SECONDS: f32 = 1.0 / 60.0;
const MAX_STEPS_PER_FRAME: u32 = 5;
const SKY_COLOR: Color = Color::new(0.53, 0.72, 0.88, 1.0);

const KEY_BINDINGS: [(KeyCode, Action); 8] = [
    (KeyCode::W, Action::Move(Direction::Forward)),
    (KeyCode::S, Action::Move(Direction::Back)),
    (KeyCode::D, Action::Move(Direction::Right)),
    (KeyCode::A, Action::Move(Direction::Left)),
    (KeyCode::Up, Action::Move(Direction::Up)),
    (KeyCode::Down, Action::Move(Direction::Down)),
    (KeyCode::Left, Action::YawLeft),
    (KeyCode::Right, Action::YawRight),
];
const RESPAWN_KEY: KeyCode = KeyCode::R;

static FAN_SPEED_BITS: AtomicU32 = AtomicU32::new(0);
static ALTITUDE_BITS: AtomicU32 = AtomicU32::new(0);
static VETOED_FRAMES: AtomicU32 = AtomicU32::new(0);
static PENDING_RESPAWN: AtomicBool = AtomicBool::new(false);

#[unsafe(no_mangle)]
pub extern "C" fn drone_fan_speed() -> f32 {
    f32::from_bits(FAN_SPEED_BITS.load(Ordering::SeqCst))
}

/// Clearance above the terrain, or the raw height when no terrain is under the drone.
#[unsafe(no_mangle)]
pub extern "C" fn drone_altitude() -> f32 {
    f32::from_bits(ALTITUDE_BITS.load(Ordering::SeqCst))
}

#[unsafe(no_mangle)]
pub extern "C" fn vetoed_frame_count() -> u32 {
    VETOED_FRAMES.load(Ordering::SeqCst)
}

#[unsafe(no_mangle)]
pub extern "C" fn request_respawn() {
    PENDING_RESPAWN.store(true, Ordering::SeqCst);
}

fn take_pending_respawn() -> bool {
    PENDING_RESPAWN.swap(false, Ordering::SeqCst)
}

fn publish_hud(fan_speed: f32, altitude: f32) {
    FAN_SPEED_BITS.store(fan_speed.to_bits(), Ordering::SeqCst);
    ALTITUDE_BITS.store(altitude.to_bits(), Ordering::SeqCst);
}

fn record_vetoed_frame() {
    VETOED_FRAMES.fetch_add(1, Ordering::SeqCst);
}

fn read_input() -> InputFrame {
    InputFrame::from_pressed(
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| is_key_down(*key))
            .map(|&(_, action)| action),
    )
}

/// Splits accumulated frame time into whole simulation steps, dropping
/// backlog past `MAX_STEPS_PER_FRAME`.
fn fixed_steps(accumulator: f32) -> (u32, f32) {
    let steps = (accumulator / FIXED_STEP_SECONDS).floor() as u32;
    if steps > MAX_STEPS_PER_FRAME {
        return (MAX_STEPS_PER_FRAME, 0.0);
    }
    (steps, accumulator - steps as f32 * FIXED_STEP_SECONDS)
}

async fn load_config() -> SimConfig {
    let json = match load_string(CONFIG_PATH).await {
        Ok(json) => json,
        Err(err) => {
            info!(path = CONFIG_PATH, %err, "no config file, using defaults");
            return SimConfig::default();
        }
    };

    match SimConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = CONFIG_PATH, %err, "invalid config, using defaults");
            SimConfig::default()
        }
    }
}

/// Fetches the configured OBJ through macroquad's loader, which also works
/// on wasm where there is no filesystem.
async fn fetch_terrain_obj(config: &SimConfig) -> Option<String> {
    let path = config.terrain.mesh_path.as_ref()?;
    match load_string(path).await {
        Ok(obj) => Some(obj),
        Err(err) => {
            warn!(path = %path, %err, "terrain mesh fetch failed");
            None
        }
    }
}

/// Builds the terrain from fetched OBJ text, or generates it from the seed.
/// Falling back clears `mesh_path`, so no mesh texture is applied.
fn build_terrain(config: &mut SimConfig, obj: Option<&str>) -> Option<Terrain> {
    if let Some(obj) = obj {
        match TerrainMesh::from_obj_str(obj, config.terrain.placement.clone()) {
            Ok(mesh) => return Some(Terrain::new(Arc::new(mesh), &config.terrain)),
            Err(err) => warn!(%err, "terrain mesh parse failed"),
        }
    }

    config.terrain.mesh_path = None;
    match load_terrain(&config.terrain) {
        Ok(terrain) => Some(terrain),
        Err(err) => {
            warn!(%err, "procedural terrain failed, flying without terrain");
            None
        }
    }
}

async fn load_terrain_texture(config: &SimConfig) -> Option<Texture2D> {
    let mesh_path = config.terrain.mesh_path.as_ref()?;
    let texture_path = Path::new(mesh_path).with_extension("png");
    let texture_path = texture_path.to_str()?;
    match load_texture(texture_path).await {
        Ok(texture) => Some(texture),
        Err(err) => {
            info!(path = texture_path, %err, "no terrain texture, using height tint");
            None
        }
    }
}

/// Camera driven by the simulation's own view and projection matrices.
struct SimCamera {
    view_projection: Mat4,
}

impl SimCamera {
    fn new(sim: &Simulation, aspect: f32) -> Self {
        Self {
            view_projection: sim.view_projection(aspect, ClipSpace::YUp),
        }
    }
}

impl Camera for SimCamera {
    fn matrix(&self) -> Mat4 {
        self.view_projection
    }

    fn depth_enabled(&self) -> bool {
        true
    }

    fn render_pass(&self) -> Option<macroquad::texture::RenderPass> {
        None
    }

    fn viewport(&self) -> Option<(i32, i32, i32, i32)> {
        None
    }
}

struct GameState {
    sim: Simulation,
    sky: SkyBox,
    terrain: Option<TerrainModel>,
    drone_draw: DroneDrawConfig,
    accumulator: f32,
    fps: f32,
    fps_frame_count: u32,
    fps_last_update_time: f64,
}

impl GameState {
    async fn new() -> Self {
        let mut config = load_config().await;
        let obj = fetch_terrain_obj(&config).await;
        let terrain = build_terrain(&mut config, obj.as_deref());
        let texture = load_terrain_texture(&config).await;
        let sim = Simulation::new(&config, terrain);
        let terrain = sim
            .terrain_mesh()
            .map(|mesh| TerrainModel::build(mesh, texture));

        if let Some(model) = &terrain {
            info!(batches = model.batch_count(), "terrain ready");
        }

        Self {
            sim,
            sky: SkyBox::new(),
            terrain,
            drone_draw: DroneDrawConfig::default(),
            accumulator: 0.0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_last_update_time: get_time(),
        }
    }

    fn update(&mut self, frame_time: f32) {
        if is_key_pressed(RESPAWN_KEY) || take_pending_respawn() {
            self.sim.respawn();
            info!("respawned");
        }

        let input = read_input();
        self.accumulator += frame_time;
        let (steps, remainder) = fixed_steps(self.accumulator);
        self.accumulator = remainder;

        for _ in 0..steps {
            let report = self.sim.step(&input, FIXED_STEP_SECONDS);
            if report.vetoed > 0 {
                record_vetoed_frame();
            }
        }

        let controller = self.sim.controller();
        let altitude = controller
            .last_clearance()
            .unwrap_or(controller.position().y);
        publish_hud(controller.state().fan_speed, altitude);
    }

    fn update_fps_if_due(&mut self) {
        let now = get_time();
        self.fps_frame_count += 1;
        let elapsed = now - self.fps_last_update_time;
        if elapsed >= 1.0 {
            self.fps = self.fps_frame_count as f32 / elapsed as f32;
            self.fps_frame_count = 0;
            self.fps_last_update_time = now;
        }
    }

    fn render(&self) {
        clear_background(SKY_COLOR);

        let aspect = screen_width() / screen_height().max(1.0);
        set_camera(&SimCamera::new(&self.sim, aspect));
        self.sky.draw(self.sim.skybox_transform());
        match &self.terrain {
            Some(terrain) => terrain.draw(),
            None => draw_grid(40, 1.0, DARKGRAY, GRAY),
        }
        let controller = self.sim.controller();
        draw_drone(
            controller.compute_world_transform(),
            &controller.fan_transforms(),
            &self.drone_draw,
        );

        set_default_camera();
        let position = controller.position();
        draw_text(
            &format!("fan speed: {:.1}", drone_fan_speed()),
            20.0,
            40.0,
            24.0,
            WHITE,
        );
        draw_text(
            &format!("altitude: {:.2}", drone_altitude()),
            20.0,
            64.0,
            24.0,
            WHITE,
        );
        draw_text(
            &format!(
                "position: {:.1}, {:.1}, {:.1}",
                position.x, position.y, position.z
            ),
            20.0,
            88.0,
            24.0,
            WHITE,
        );
        draw_text(
            &format!("vetoed frames: {}", vetoed_frame_count()),
            20.0,
            112.0,
            24.0,
            WHITE,
        );
        draw_text(&format!("fps: {:.1}", self.fps), 20.0, 136.0, 24.0, WHITE);
    }
}

pub async fn run() {
    install_panic_hook();
    let mut game = GameState::new().await;

    loop {
        game.update(get_frame_time());
        game.update_fps_if_due();
        game.render();

        next_frame().await;
    }
}

#[cfg(target_arch = "wasm32")]
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if let Some(location) = info.location() {
            miniquad::error!("panic at {}:{}: {}", location.file(), location.line(), msg);
        } else {
            miniquad::error!("panic: {}", msg);
        }
    }));
}

#[cfg(not(target_arch = "wasm32"))]
fn install_panic_hook() {}
