use crate::config::{ConfigError, invalid};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Vertical direction of clip space: Vulkan-style targets point +Y down,
/// OpenGL (and macroquad) point it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSpace {
    YDown,
    YUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(invalid("fov_y_degrees must be within (0, 180)"));
        }
        if self.near <= 0.0 || self.far <= self.near {
            return Err(invalid("camera planes must satisfy 0 < near < far"));
        }
        Ok(())
    }

    /// Perspective projection with Y flipped for a Y-down clip space.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        self.projection_for(aspect, ClipSpace::YDown)
    }

    pub fn projection_for(&self, aspect: f32, clip: ClipSpace) -> Mat4 {
        let fov = self.fov_y_degrees.to_radians();
        let mut proj = match clip {
            ClipSpace::YDown => Mat4::perspective_rh(fov, aspect, self.near, self.far),
            // GL depth runs -1..1.
            ClipSpace::YUp => Mat4::perspective_rh_gl(fov, aspect, self.near, self.far),
        };
        if clip == ClipSpace::YDown {
            proj.y_axis.y *= -1.0;
        }
        proj
    }

    /// Sky cube centered under `target`, large enough to enclose the far plane.
    pub fn skybox_transform(&self, target: Vec3) -> Mat4 {
        Mat4::from_translation(target)
            * Mat4::from_translation(Vec3::new(0.0, -self.far / 2.0, 0.0))
            * Mat4::from_scale(Vec3::splat(4.0 * self.far))
    }
}

/// View matrix of a camera at `eye` looking at `target` with +Y up.
pub fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, Vec3::Y)
}
