use loam_blocks::BlockType;
use loam_world::{NoiseBasis, WorldGenConfig};

const SHIPPED: &str = include_str!("../../../config/loam.toml");

#[test]
fn shipped_config_matches_defaults() {
    let cfg = WorldGenConfig::from_toml_str(SHIPPED).unwrap();
    let def = WorldGenConfig::default();
    assert_eq!(cfg.dims(), def.dims());
    assert_eq!(cfg.world.draw_radius, def.world.draw_radius);
    assert_eq!(cfg.world.vertical_band, def.world.vertical_band);
    assert_eq!(cfg.poll_interval(), def.poll_interval());
    assert_eq!(cfg.terrain.offset, def.terrain.offset);
    assert_eq!(cfg.terrain.basis, NoiseBasis::Perlin);
    assert_eq!(cfg.warp.noise_z.seed, def.warp.noise_z.seed);
    assert_eq!(cfg.layers.shore_block, BlockType::Sand);
    assert_eq!(cfg.layers.trunks.salt, def.layers.trunks.salt);
    assert_eq!(cfg.layers.stone.noise.offset, def.layers.stone.noise.offset);
}

#[test]
fn empty_file_is_all_defaults() {
    let cfg = WorldGenConfig::from_toml_str("").unwrap();
    assert_eq!(cfg.dims(), WorldGenConfig::default().dims());
    assert!(cfg.warp.enabled);
}

#[test]
fn rejects_unknown_block_names() {
    let err = WorldGenConfig::from_toml_str("[layers]\nsurface_block = \"lava\"\n");
    assert!(err.is_err());
}
