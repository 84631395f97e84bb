use macroquad::miniquad::{Comparison, PipelineParams, ShaderSource};
use macroquad::prelude::*;
use tracing::warn;

use crate::drone::{CUBE_FACES, box_corners};

const ZENITH_COLOR: Color = Color::new(0.33, 0.55, 0.82, 1.0);
const HORIZON_COLOR: Color = Color::new(0.78, 0.86, 0.93, 1.0);

/// Unit cube, scaled and placed by the camera's skybox transform.
const UNIT_HALF_EXTENT: f32 = 0.5;

// Writes z = w so the sky sits on the far plane whatever its size, and
// never occludes the scene drawn after it.
const SKY_VERTEX: &str = r#"#version 100
attribute vec3 position;
attribute vec2 texcoord;
attribute vec4 color0;

varying lowp vec4 color;

uniform mat4 Model;
uniform mat4 Projection;

void main() {
    vec4 clip = Projection * Model * vec4(position, 1);
    gl_Position = clip.xyww;
    color = color0 / 255.0;
}
"#;

const SKY_FRAGMENT: &str = r#"#version 100
varying lowp vec4 color;

void main() {
    gl_FragColor = color;
}
"#;

/// Sky cube in world space: zenith tint on the top corners, horizon tint below.
pub fn sky_mesh(skybox_transform: Mat4) -> Mesh {
    let local = box_corners(Vec3::ZERO, Vec3::splat(UNIT_HALF_EXTENT));
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for face in CUBE_FACES {
        let base = vertices.len() as u16;
        for &corner in &face {
            let color = if local[corner].y > 0.0 {
                ZENITH_COLOR
            } else {
                HORIZON_COLOR
            };
            let position = skybox_transform.transform_point3(local[corner]);
            vertices.push(Vertex::new2(position, Vec2::ZERO, color));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh {
        vertices,
        indices,
        texture: None,
    }
}

pub struct SkyBox {
    material: Option<Material>,
}

impl SkyBox {
    pub fn new() -> Self {
        let material = load_material(
            ShaderSource::Glsl {
                vertex: SKY_VERTEX,
                fragment: SKY_FRAGMENT,
            },
            MaterialParams {
                pipeline_params: PipelineParams {
                    depth_test: Comparison::LessOrEqual,
                    depth_write: false,
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        match material {
            Ok(material) => Self {
                material: Some(material),
            },
            Err(err) => {
                warn!(%err, "sky shader failed, falling back to the clear color");
                Self { material: None }
            }
        }
    }

    /// Must run under the 3D camera, before anything else in the scene.
    pub fn draw(&self, skybox_transform: Mat4) {
        let Some(material) = &self.material else {
            return;
        };
        gl_use_material(material);
        draw_mesh(&sky_mesh(skybox_transform));
        gl_use_default_material();
    }
}
