#![cfg(feature = "generator")]

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use d_gen_terrain::generator::build_height_texture;
use d_gen_terrain::layout;
use d_gen_terrain::obj::write_obj;
use dronesim_core::{DeterministicTerrain, SimConfig};
use tracing::info;

fn workspace_root() -> Result<PathBuf, Box<dyn Error>> {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| "workspace root".into())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let mut config = SimConfig::default();
    if let Some(seed) = std::env::args().nth(1) {
        config.terrain.seed = seed.parse()?;
    }

    let root = workspace_root()?;
    let asset_dir = root.join(layout::ASSET_DIR);
    std::fs::create_dir_all(&asset_dir)?;

    let terrain = DeterministicTerrain::new(config.terrain.seed);
    let mesh = terrain.build(config.terrain.placement.clone())?;

    let mesh_path = asset_dir.join(layout::MESH_FILE);
    write_obj(&mesh, BufWriter::new(File::create(&mesh_path)?))?;
    info!(path = %mesh_path.display(), "wrote terrain mesh");

    let texture_path = asset_dir.join(layout::TEXTURE_FILE);
    build_height_texture(&terrain, layout::TEXTURE_PIXEL_SIZE).save(&texture_path)?;
    info!(path = %texture_path.display(), "wrote terrain texture");

    // The host resolves asset paths against its working directory.
    config.terrain.mesh_path = Some(format!("{}/{}", layout::ASSET_DIR, layout::MESH_FILE));
    let config_path = asset_dir.join(layout::CONFIG_FILE);
    std::fs::write(&config_path, config.to_json_pretty()?)?;
    info!(path = %config_path.display(), seed = config.terrain.seed, "wrote config");

    Ok(())
}
