use macroquad::prelude::*;

#[derive(Debug, Clone)]
pub struct DroneDrawConfig {
    pub body_half_extents: Vec3, // drone model units, before drone_scale
    pub rotor_radius: f32,
    pub rotor_blades: usize,
    pub body_color: Color,
    pub arm_color: Color,
    pub rotor_color: Color,
}

impl Default for DroneDrawConfig {
    fn default() -> Self {
        Self {
            body_half_extents: vec3(18.0, 7.0, 22.0),
            rotor_radius: 16.0,
            rotor_blades: 2,
            body_color: Color::from_rgba(45, 45, 45, 255),
            arm_color: Color::from_rgba(120, 120, 120, 255),
            rotor_color: Color::from_rgba(194, 133, 74, 255),
        }
    }
}

pub(crate) const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 3, 2], // -x
    [4, 6, 7, 5], // +x
    [0, 4, 5, 1], // -y
    [2, 3, 7, 6], // +y
    [0, 2, 6, 4], // -z
    [1, 5, 7, 3], // +z
];

/// Corners of an axis-aligned box, bit 2 = +x, bit 1 = +y, bit 0 = +z.
pub(crate) fn box_corners(center: Vec3, half: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
        *corner = center + half * vec3(sign(4), sign(2), sign(1));
    }
    corners
}

/// Box triangles in world space, ready for a colored `Mesh`.
pub fn transformed_box(transform: Mat4, center: Vec3, half: Vec3, color: Color) -> Mesh {
    let corners = box_corners(center, half).map(|corner| transform.transform_point3(corner));
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for face in CUBE_FACES {
        let base = vertices.len() as u16;
        for &corner in &face {
            vertices.push(Vertex::new2(corners[corner], Vec2::ZERO, color));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh {
        vertices,
        indices,
        texture: None,
    }
}

/// Blade tips of one rotor in world space, as (start, end) segments.
pub fn rotor_segments(fan_transform: Mat4, radius: f32, blades: usize) -> Vec<(Vec3, Vec3)> {
    let hub = fan_transform.transform_point3(Vec3::ZERO);
    let blades = blades.max(1);
    (0..blades * 2)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::PI / blades as f32;
            let tip = vec3(angle.cos() * radius, 0.0, angle.sin() * radius);
            (hub, fan_transform.transform_point3(tip))
        })
        .collect()
}

pub fn draw_drone(body: Mat4, fans: &[Mat4; 4], config: &DroneDrawConfig) {
    draw_mesh(&transformed_box(
        body,
        Vec3::ZERO,
        config.body_half_extents,
        config.body_color,
    ));

    let center = body.transform_point3(Vec3::ZERO);
    for fan in fans {
        draw_line_3d(center, fan.transform_point3(Vec3::ZERO), config.arm_color);
        for (start, end) in rotor_segments(*fan, config.rotor_radius, config.rotor_blades) {
            draw_line_3d(start, end, config.rotor_color);
        }
    }
}
