//! Drone flight model.
//!
//! Key presses are turned into per-direction speeds that ramp up by a fixed
//! step while held and bleed off while released. Horizontal motion also leans
//! the drone, and every translation is checked against the terrain: a step
//! that leaves too little clearance is rolled back.

use crate::config::{FlightConfig, VetoPolicy};
use crate::direction::Direction;
use crate::drone::DroneState;
use crate::sim::SimContext;
use crate::terrain::HeightQuery;
use glam::{Mat4, Quat, Vec3};
use std::fmt;
use tracing::debug;

/// Result of a single move or stop call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing was translated (not enough thrust, or already at rest).
    Idle,
    Moved,
    /// The step ended too close to the terrain and was undone.
    Vetoed,
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    position: Vec3,
    attitude: Vec3,
    camera: Vec3,
}

pub struct FlightController {
    config: FlightConfig,
    state: DroneState,
    height_query: Option<Box<dyn HeightQuery>>,
    last_clearance: Option<f32>,
}

impl fmt::Debug for FlightController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightController")
            .field("state", &self.state)
            .field("has_height_query", &self.height_query.is_some())
            .field("last_clearance", &self.last_clearance)
            .finish_non_exhaustive()
    }
}

impl FlightController {
    pub fn new(config: FlightConfig) -> Self {
        let state = DroneState::spawn(&config);
        Self {
            config,
            state,
            height_query: None,
            last_clearance: None,
        }
    }

    pub fn with_height_query(mut self, query: impl HeightQuery + 'static) -> Self {
        self.set_height_query(query);
        self
    }

    pub fn set_height_query(&mut self, query: impl HeightQuery + 'static) {
        self.height_query = Some(Box::new(query));
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn state(&self) -> &DroneState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Context with the camera at its spawn offset behind the drone.
    pub fn spawn_context(&self) -> SimContext {
        SimContext::new(self.config.initial_position + self.config.camera_offset)
    }

    /// Puts the drone back at its spawn pose and re-seats the camera.
    pub fn respawn(&mut self, ctx: &mut SimContext) {
        self.state = DroneState::spawn(&self.config);
        self.last_clearance = None;
        ctx.camera_position = self.config.initial_position + self.config.camera_offset;
    }

    pub fn move_in(&mut self, direction: Direction, dt: f32, ctx: &mut SimContext) -> StepOutcome {
        let snapshot = self.snapshot(ctx);
        let threshold = self.config.min_fan_speed_to_move;

        if self.state.fan_speed < threshold * 0.5 {
            return StepOutcome::Idle;
        }

        // Leaning only needs half the lift that moving does.
        self.lean_toward(direction, dt);

        if self.state.fan_speed < threshold {
            return StepOutcome::Idle;
        }

        let speed = (self.state.speeds[direction] + self.config.drone_acceleration_rate)
            .min(self.config.drone_max_speed);
        self.state.speeds[direction] = speed;
        self.translate(direction, speed, dt, ctx);
        self.settle(snapshot, ctx)
    }

    pub fn stop(&mut self, direction: Direction, dt: f32, ctx: &mut SimContext) -> StepOutcome {
        let snapshot = self.snapshot(ctx);
        self.level(direction, dt);

        let speed = self.state.speeds[direction];
        if speed <= 0.0 {
            return StepOutcome::Idle;
        }

        let speed = (speed - self.config.drone_deceleration_rate).max(0.0);
        self.state.speeds[direction] = speed;
        self.translate(direction, speed, dt, ctx);
        self.settle(snapshot, ctx)
    }

    pub fn activate_fans(&mut self) {
        if self.state.fan_speed >= self.config.fan_max_speed {
            return;
        }
        self.state.fan_speed =
            (self.state.fan_speed + self.config.fan_acceleration_rate).min(self.config.fan_max_speed);
    }

    pub fn deactivate_fans(&mut self) {
        if self.state.fan_speed <= self.config.fan_min_speed {
            return;
        }
        self.state.fan_speed = (self.state.fan_speed - self.config.fan_deceleration_rate)
            .max(self.config.fan_min_speed);
    }

    /// Turns the heading by `sign * rotation_speed * dt` and swings the camera
    /// around the drone by the same angle.
    pub fn rotate_view(&mut self, dt: f32, sign: f32, ctx: &mut SimContext) {
        let delta = sign * self.config.rotation_speed * dt;
        self.state.attitude.y += delta;

        let pivot = self.state.position;
        ctx.camera_position = pivot + Quat::from_rotation_y(delta) * (ctx.camera_position - pivot);
    }

    /// Advances the rotor spin by the current fan speed, read as degrees per frame.
    pub fn spin_fans(&mut self) {
        let step = Quat::from_rotation_y(-self.state.fan_speed.to_radians());
        self.state.fan_rotation = (self.state.fan_rotation * step).normalize();
    }

    pub fn compute_world_transform(&self) -> Mat4 {
        self.state.world_transform(self.config.drone_scale)
    }

    pub fn fan_transforms(&self) -> [Mat4; 4] {
        let body = Mat4::from_rotation_translation(self.state.rotation(), self.state.position);
        let spin = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.config.drone_scale),
            self.state.fan_rotation,
            Vec3::ZERO,
        );
        self.config
            .fan_offsets
            .map(|offset| body * Mat4::from_translation(offset) * spin)
    }

    /// World-space position of the clearance probe on the drone mesh.
    pub fn probe_position(&self) -> Vec3 {
        self.compute_world_transform()
            .transform_point3(self.config.clearance_probe)
    }

    /// Clearance measured after the last accepted translation. Reading it
    /// does not query the terrain.
    pub fn last_clearance(&self) -> Option<f32> {
        self.last_clearance
    }

    /// Height of the probe above the terrain point under it, if the terrain knows one.
    pub fn clearance(&mut self) -> Option<f32> {
        let probe = self.probe_position();
        let query = self.height_query.as_mut()?;
        let ground = query.nearest_height(probe.x, probe.z)?;
        Some(probe.y - ground.y)
    }

    fn snapshot(&self, ctx: &SimContext) -> Snapshot {
        Snapshot {
            position: self.state.position,
            attitude: self.state.attitude,
            camera: ctx.camera_position,
        }
    }

    fn lean_toward(&mut self, direction: Direction, dt: f32) {
        let Some(lean) = direction.lean() else {
            return;
        };
        let max = self.config.max_inclination;
        let amount = lean.amount(self.state.attitude);
        if amount >= max {
            return;
        }
        let amount = (amount + self.config.inclination_speed * dt).min(max);
        lean.set_amount(&mut self.state.attitude, amount);
    }

    fn level(&mut self, direction: Direction, dt: f32) {
        let Some(lean) = direction.lean() else {
            return;
        };
        let amount = lean.amount(self.state.attitude);
        if amount <= 0.0 {
            return;
        }
        let amount = (amount - self.config.leveling_speed * dt).max(0.0);
        lean.set_amount(&mut self.state.attitude, amount);
    }

    fn translate(&mut self, direction: Direction, speed: f32, dt: f32, ctx: &mut SimContext) {
        let offset = Quat::from_rotation_y(self.state.yaw()) * direction.unit_vector() * speed * dt;
        self.state.position += offset;
        ctx.camera_position += offset;
    }

    fn settle(&mut self, snapshot: Snapshot, ctx: &mut SimContext) -> StepOutcome {
        let clearance = self.clearance();
        match clearance {
            Some(clearance) if clearance <= self.config.min_distance_to_terrain => {
                self.state.position = snapshot.position;
                ctx.camera_position = snapshot.camera;
                self.state.attitude = match self.config.veto_policy {
                    VetoPolicy::Restore => snapshot.attitude,
                    VetoPolicy::Level => Vec3::new(0.0, snapshot.attitude.y, 0.0),
                };
                debug!(clearance, position = ?self.state.position, "terrain vetoed step");
                StepOutcome::Vetoed
            }
            _ => {
                self.last_clearance = clearance;
                StepOutcome::Moved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 0.016;

    fn controller() -> (FlightController, SimContext) {
        let controller = FlightController::new(FlightConfig::default());
        let ctx = controller.spawn_context();
        (controller, ctx)
    }

    fn with_fan(fan_speed: f32) -> (FlightController, SimContext) {
        let (mut controller, ctx) = controller();
        controller.state.fan_speed = fan_speed;
        (controller, ctx)
    }

    /// Ground far below, except a tall wall just in front of the spawn point.
    fn wall_ahead(spawn_z: f32) -> impl FnMut(f32, f32) -> Option<Vec3> {
        move |x, z| {
            let height = if z < spawn_z - 1e-4 { 100.0 } else { -50.0 };
            Some(Vec3::new(x, height, z))
        }
    }

    #[test]
    fn no_thrust_means_no_motion() {
        let (mut controller, mut ctx) = with_fan(8.9);
        let before = *controller.state();
        let camera = ctx.camera_position;

        for direction in Direction::ALL {
            assert_eq!(controller.move_in(direction, DT, &mut ctx), StepOutcome::Idle);
        }

        assert_eq!(*controller.state(), before);
        assert_eq!(ctx.camera_position, camera);
    }

    #[test]
    fn half_thrust_leans_without_moving() {
        let (mut controller, mut ctx) = with_fan(12.0);
        let position = controller.position();

        controller.move_in(Direction::Forward, DT, &mut ctx);

        assert_eq!(controller.position(), position);
        assert_eq!(controller.state().speed(Direction::Forward), 0.0);
        assert!(controller.state().attitude.x < 0.0);
    }

    #[test]
    fn speed_clamps_at_max() {
        let (mut controller, mut ctx) = with_fan(30.0);
        let max = controller.config().drone_max_speed;

        for _ in 0..100 {
            controller.move_in(Direction::Up, DT, &mut ctx);
            let speed = controller.state().speed(Direction::Up);
            assert!((0.0..=max).contains(&speed));
        }

        assert_eq!(controller.state().speed(Direction::Up), max);
    }

    #[test]
    fn fans_converge_to_bounds() {
        let (mut controller, _) = controller();
        let config = controller.config().clone();

        for _ in 0..100 {
            controller.activate_fans();
            assert!(controller.state().fan_speed <= config.fan_max_speed);
        }
        assert_eq!(controller.state().fan_speed, config.fan_max_speed);

        for _ in 0..100 {
            controller.deactivate_fans();
            assert!(controller.state().fan_speed >= config.fan_min_speed);
        }
        assert_eq!(controller.state().fan_speed, config.fan_min_speed);
    }

    #[test]
    fn fans_never_overshoot_odd_bounds() {
        let config = FlightConfig {
            fan_min_speed: 10.2,
            fan_max_speed: 29.9,
            ..FlightConfig::default()
        };
        let mut controller = FlightController::new(config);

        for _ in 0..100 {
            controller.activate_fans();
        }
        assert_eq!(controller.state().fan_speed, 29.9);

        for _ in 0..100 {
            controller.deactivate_fans();
        }
        assert_eq!(controller.state().fan_speed, 10.2);
    }

    #[test]
    fn tilt_stays_within_bounds() {
        let (mut controller, mut ctx) = with_fan(30.0);
        let max = controller.config().max_inclination;
        let mut rng = fastrand::Rng::with_seed(11);

        for _ in 0..2000 {
            let direction = Direction::ALL[rng.usize(..Direction::ALL.len())];
            let dt = rng.f32() * 0.2;
            if rng.bool() {
                controller.move_in(direction, dt, &mut ctx);
            } else {
                controller.stop(direction, dt, &mut ctx);
            }
            let attitude = controller.state().attitude;
            assert!(attitude.x.abs() <= max, "pitch {}", attitude.x);
            assert!(attitude.z.abs() <= max, "roll {}", attitude.z);
        }
    }

    #[test]
    fn releasing_levels_toward_zero_without_crossing() {
        let (mut controller, mut ctx) = with_fan(30.0);
        for _ in 0..10 {
            controller.move_in(Direction::Right, DT, &mut ctx);
        }
        assert!(controller.state().attitude.z < 0.0);

        for _ in 0..100 {
            controller.stop(Direction::Right, DT, &mut ctx);
            assert!(controller.state().attitude.z <= 0.0);
        }
        assert_eq!(controller.state().attitude.z, 0.0);
    }

    #[test]
    fn leveling_is_faster_than_leaning() {
        let (mut controller, mut ctx) = with_fan(30.0);
        controller.move_in(Direction::Back, 0.1, &mut ctx);
        let leaned = controller.state().attitude.x;

        controller.stop(Direction::Back, 0.025, &mut ctx);
        let after = controller.state().attitude.x;

        let config = controller.config();
        assert!((leaned - config.inclination_speed * 0.1).abs() < 1e-6);
        assert!((leaned - after - config.leveling_speed * 0.025).abs() < 1e-6);
    }

    #[test]
    fn stop_floors_speed_at_zero() {
        let (mut controller, mut ctx) = controller();
        controller.state.speeds[Direction::Left] = 1.0;

        for _ in 0..50 {
            controller.stop(Direction::Left, DT, &mut ctx);
            assert!(controller.state().speed(Direction::Left) >= 0.0);
        }

        assert_eq!(controller.state().speed(Direction::Left), 0.0);
        let position = controller.position();
        assert_eq!(controller.stop(Direction::Left, DT, &mut ctx), StepOutcome::Idle);
        assert_eq!(controller.position(), position);
    }

    #[test]
    fn coasting_keeps_moving_after_release() {
        let (mut controller, mut ctx) = with_fan(30.0);
        for _ in 0..5 {
            controller.move_in(Direction::Forward, DT, &mut ctx);
        }
        let z = controller.position().z;

        assert_eq!(controller.stop(Direction::Forward, DT, &mut ctx), StepOutcome::Moved);
        assert!(controller.position().z < z);
    }

    #[test]
    fn movement_follows_yaw() {
        let (mut controller, mut ctx) = with_fan(30.0);
        let start = controller.position();

        controller.state.attitude.y = std::f32::consts::FRAC_PI_2;
        controller.move_in(Direction::Forward, DT, &mut ctx);

        let moved = controller.position() - start;
        assert!(moved.x < 0.0);
        assert!(moved.z.abs() < 1e-6);
    }

    #[test]
    fn camera_shadows_the_drone() {
        let (mut controller, mut ctx) = with_fan(30.0);
        let offset = ctx.camera_position - controller.position();

        for _ in 0..20 {
            controller.move_in(Direction::Left, DT, &mut ctx);
            controller.move_in(Direction::Up, DT, &mut ctx);
        }

        let drift = (ctx.camera_position - controller.position()) - offset;
        assert!(drift.length() < 1e-4);
    }

    #[test]
    fn veto_restores_pre_call_state() {
        let config = FlightConfig::default();
        let spawn_z = config.initial_position.z;
        let mut controller = FlightController::new(config).with_height_query(wall_ahead(spawn_z));
        let mut ctx = controller.spawn_context();
        controller.state.fan_speed = 20.0;

        // Lean sideways first so there is tilt to restore.
        for _ in 0..3 {
            assert_eq!(
                controller.move_in(Direction::Left, DT, &mut ctx),
                StepOutcome::Moved
            );
        }
        let position = controller.position();
        let attitude = controller.state().attitude;
        let camera = ctx.camera_position;
        assert!(attitude.z != 0.0);

        assert_eq!(
            controller.move_in(Direction::Forward, DT, &mut ctx),
            StepOutcome::Vetoed
        );
        assert_eq!(controller.position(), position);
        assert_eq!(controller.state().attitude, attitude);
        assert_eq!(ctx.camera_position, camera);
    }

    #[test]
    fn level_policy_drops_tilt_on_veto() {
        let config = FlightConfig {
            veto_policy: VetoPolicy::Level,
            ..FlightConfig::default()
        };
        let spawn_z = config.initial_position.z;
        let mut controller = FlightController::new(config).with_height_query(wall_ahead(spawn_z));
        let mut ctx = controller.spawn_context();
        controller.state.fan_speed = 20.0;
        controller.state.attitude = Vec3::new(0.0, 0.0, 0.1);

        let position = controller.position();
        assert_eq!(
            controller.move_in(Direction::Forward, DT, &mut ctx),
            StepOutcome::Vetoed
        );
        assert_eq!(controller.position(), position);
        assert_eq!(controller.state().attitude, Vec3::ZERO);
    }

    #[test]
    fn coasting_is_vetoed_too() {
        let config = FlightConfig::default();
        let spawn_z = config.initial_position.z;
        let mut controller = FlightController::new(config).with_height_query(wall_ahead(spawn_z));
        let mut ctx = controller.spawn_context();
        controller.state.speeds[Direction::Forward] = 5.0;

        let position = controller.position();
        assert_eq!(
            controller.stop(Direction::Forward, DT, &mut ctx),
            StepOutcome::Vetoed
        );
        assert_eq!(controller.position(), position);
    }

    #[test]
    fn terrain_miss_never_vetoes() {
        let (controller, _) = controller();
        let mut controller = controller.with_height_query(|_: f32, _: f32| -> Option<Vec3> { None });
        let mut ctx = controller.spawn_context();
        controller.state.fan_speed = 20.0;

        assert_eq!(controller.clearance(), None);
        assert_eq!(
            controller.move_in(Direction::Down, DT, &mut ctx),
            StepOutcome::Moved
        );
    }

    #[test]
    fn clearance_measures_probe_height() {
        let (controller, _) = controller();
        let mut controller =
            controller.with_height_query(|x: f32, z: f32| Some(Vec3::new(x, 1.0, z)));

        let probe = controller.probe_position();
        let expected = probe.y - 1.0;
        assert!((controller.clearance().unwrap() - expected).abs() < 1e-6);
        assert!(probe.y < controller.position().y);
    }

    #[test]
    fn last_clearance_tracks_accepted_steps_without_querying() {
        let queries = Rc::new(Cell::new(0));
        let counter = Rc::clone(&queries);
        let (controller, _) = controller();
        let mut controller = controller.with_height_query(move |x: f32, z: f32| {
            counter.set(counter.get() + 1);
            Some(Vec3::new(x, 1.0, z))
        });
        let mut ctx = controller.spawn_context();
        controller.state.fan_speed = 20.0;
        assert_eq!(controller.last_clearance(), None);

        assert_eq!(
            controller.move_in(Direction::Up, DT, &mut ctx),
            StepOutcome::Moved
        );
        let expected = controller.probe_position().y - 1.0;
        let after_step = queries.get();

        for _ in 0..10 {
            let cached = controller.last_clearance().unwrap();
            assert!((cached - expected).abs() < 1e-6);
        }
        assert_eq!(queries.get(), after_step);

        controller.respawn(&mut ctx);
        assert_eq!(controller.last_clearance(), None);
    }

    #[test]
    fn vetoed_step_keeps_previous_clearance() {
        let config = FlightConfig::default();
        let spawn_z = config.initial_position.z;
        let mut controller = FlightController::new(config).with_height_query(wall_ahead(spawn_z));
        let mut ctx = controller.spawn_context();
        controller.state.fan_speed = 20.0;

        controller.move_in(Direction::Left, DT, &mut ctx);
        let before = controller.last_clearance().unwrap();
        assert!(before > 0.0);

        assert_eq!(
            controller.move_in(Direction::Forward, DT, &mut ctx),
            StepOutcome::Vetoed
        );
        assert_eq!(controller.last_clearance(), Some(before));
    }

    #[test]
    fn rotate_view_orbits_camera() {
        let (mut controller, mut ctx) = controller();
        let radius = (ctx.camera_position - controller.position()).length();
        let height = ctx.camera_position.y;

        controller.rotate_view(0.5, 1.0, &mut ctx);

        let expected_yaw = controller.config().rotation_speed * 0.5;
        assert!((controller.state().yaw() - expected_yaw).abs() < 1e-6);
        let new_radius = (ctx.camera_position - controller.position()).length();
        assert!((new_radius - radius).abs() < 1e-4);
        assert!((ctx.camera_position.y - height).abs() < 1e-5);

        controller.rotate_view(0.5, -1.0, &mut ctx);
        assert!(controller.state().yaw().abs() < 1e-6);
    }

    #[test]
    fn world_transform_places_drone() {
        let (controller, _) = controller();
        let world = controller.compute_world_transform();
        assert_eq!(world.transform_point3(Vec3::ZERO), controller.position());
    }

    #[test]
    fn fans_sit_at_their_offsets() {
        let (controller, _) = controller();
        let offsets = controller.config().fan_offsets;

        for (transform, offset) in controller.fan_transforms().iter().zip(offsets) {
            let hub = transform.transform_point3(Vec3::ZERO);
            assert!((hub - (controller.position() + offset)).length() < 1e-5);
        }
    }

    #[test]
    fn fans_spin_by_fan_speed() {
        let (mut controller, _) = controller();
        controller.spin_fans();

        let expected = Quat::from_rotation_y(-controller.state().fan_speed.to_radians());
        assert!(controller.state().fan_rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn respawn_resets_pose_and_camera() {
        let (mut controller, mut ctx) = with_fan(30.0);
        for _ in 0..10 {
            controller.move_in(Direction::Right, DT, &mut ctx);
        }
        controller.respawn(&mut ctx);

        let config = controller.config();
        assert_eq!(controller.position(), config.initial_position);
        assert_eq!(
            ctx.camera_position,
            config.initial_position + config.camera_offset
        );
    }
}
