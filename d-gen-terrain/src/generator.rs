use image::{Rgba, RgbaImage};

use crate::layout;
use dronesim_core::DeterministicTerrain;

#[derive(Clone, Copy)]
struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

fn color_from_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Color {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        a: a as f32 / 255.0,
    }
}

fn color_to_rgba(color: Color) -> Rgba<u8> {
    let to_u8 = |channel: f32| -> u8 { (channel.clamp(0.0, 1.0) * 255.0).round() as u8 };
    Rgba([
        to_u8(color.r),
        to_u8(color.g),
        to_u8(color.b),
        to_u8(color.a),
    ])
}

fn band_color(band: usize) -> Color {
    match band {
        0 => color_from_rgba(64, 92, 48, 255),    // lowland grass
        1 => color_from_rgba(96, 128, 62, 255),   // meadow
        2 => color_from_rgba(143, 99, 63, 255),   // dirt
        3 => color_from_rgba(120, 120, 120, 255), // rock
        _ => color_from_rgba(236, 236, 230, 255), // snow
    }
}

fn apply_saturation_and_brightness(color: Color, saturation: f32, brightness: f32) -> Color {
    let intensity = (color.r + color.g + color.b) / 3.0;
    let adjust = |channel: f32| -> f32 {
        let saturated = intensity + (channel - intensity) * saturation;
        (saturated * brightness).clamp(0.0, 1.0)
    };

    Color {
        r: adjust(color.r),
        g: adjust(color.g),
        b: adjust(color.b),
        a: color.a,
    }
}

/// Light from the low-column side: slopes rising toward +column get darker.
fn slope_brightness(terrain: &DeterministicTerrain, column: usize, row: usize) -> f32 {
    let last = terrain.side() - 1;
    let left = terrain.height_at(column.saturating_sub(1), row);
    let right = terrain.height_at((column + 1).min(last), row);
    (1.0 - (right - left) * 0.8).clamp(0.6, 1.25)
}

fn height_range(terrain: &DeterministicTerrain) -> (f32, f32) {
    let side = terrain.side();
    let mut range = (f32::INFINITY, f32::NEG_INFINITY);
    for row in 0..side {
        for column in 0..side {
            let h = terrain.height_at(column, row);
            range = (range.0.min(h), range.1.max(h));
        }
    }
    range
}

/// Height-banded, slope-shaded texture matching the terrain's UV layout.
pub fn build_height_texture(terrain: &DeterministicTerrain, size_px: u32) -> RgbaImage {
    let cells = terrain.side() - 1;
    let (min, max) = height_range(terrain);
    let span = (max - min).max(f32::EPSILON);

    RgbaImage::from_fn(size_px, size_px, |x, y| {
        let (column, row) = layout::texel_to_grid(x, y, size_px, cells);
        let normalized = (terrain.height_at(column, row) - min) / span;
        let base = band_color(layout::band_index(normalized));
        let shaded =
            apply_saturation_and_brightness(base, 1.1, slope_brightness(terrain, column, row));
        color_to_rgba(shaded)
    })
}
