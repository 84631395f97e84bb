use crate::config::FlightConfig;
use crate::direction::{Direction, DirectionTable};
use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroneState {
    pub position: Vec3,
    /// x = pitch lean, y = yaw heading, z = roll lean (radians).
    pub attitude: Vec3,
    pub fan_speed: f32,
    pub speeds: DirectionTable<f32>,
    pub fan_rotation: Quat,
}

impl DroneState {
    pub fn spawn(config: &FlightConfig) -> Self {
        Self {
            position: config.initial_position,
            attitude: Vec3::ZERO,
            fan_speed: config.fan_min_speed,
            speeds: DirectionTable::splat(0.0),
            fan_rotation: Quat::IDENTITY,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.attitude.y
    }

    pub fn speed(&self, direction: Direction) -> f32 {
        self.speeds[direction]
    }

    /// Heading first, then pitch, then roll.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.attitude.y)
            * Quat::from_rotation_x(self.attitude.x)
            * Quat::from_rotation_z(self.attitude.z)
    }

    pub fn world_transform(&self, scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(scale), self.rotation(), self.position)
    }

    pub fn is_level(&self) -> bool {
        self.attitude.x == 0.0 && self.attitude.z == 0.0
    }
}
