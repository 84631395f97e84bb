pub const TEXTURE_PIXEL_SIZE: u32 = 512;

pub const ASSET_DIR: &str = "assets";
pub const MESH_FILE: &str = "terrain.obj";
pub const TEXTURE_FILE: &str = "terrain.png";
pub const CONFIG_FILE: &str = "dronesim.json";

/// Height bands as fractions of the terrain's height range, low to high.
pub const BAND_LIMITS: [f32; 4] = [0.2, 0.45, 0.75, 0.9];

/// Grid vertex sampled by texel (`x`, `y`) of a `size`-pixel square texture
/// stretched over a grid of `cells` cells.
pub fn texel_to_grid(x: u32, y: u32, size: u32, cells: usize) -> (usize, usize) {
    let last = size.saturating_sub(1).max(1) as f32;
    let to_grid = |p: u32| ((p as f32 / last) * cells as f32).round() as usize;
    (to_grid(x).min(cells), to_grid(y).min(cells))
}

/// Index into `BAND_LIMITS` + 1 bands for a normalized height.
pub fn band_index(normalized: f32) -> usize {
    BAND_LIMITS
        .iter()
        .position(|&limit| normalized < limit)
        .unwrap_or(BAND_LIMITS.len())
}
