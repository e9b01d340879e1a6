use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use loam_blocks::BlockType;
use serde::{Deserialize, Serialize};

use crate::chunk_position::{ChunkDims, SeedOffset};
use crate::noise::NoiseSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse worldgen config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid worldgen config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default = "default_terrain")]
    pub terrain: NoiseSettings,
    #[serde(default)]
    pub warp: Warp,
    #[serde(default)]
    pub layers: Layers,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            world: WorldSection::default(),
            terrain: default_terrain(),
            warp: Warp::default(),
            layers: Layers::default(),
        }
    }
}

fn default_terrain() -> NoiseSettings {
    NoiseSettings {
        offset: [-700.0, 880.0],
        ..NoiseSettings::default()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WorldSection {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_chunk_height")]
    pub chunk_height: i32,
    #[serde(default = "default_draw_radius")]
    pub draw_radius: i32,
    #[serde(default = "default_vertical_band")]
    pub vertical_band: i32,
    #[serde(default)]
    pub seed_offset: [i32; 2],
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Worker threads; 0 picks the available parallelism.
    #[serde(default)]
    pub workers: usize,
}
fn default_chunk_size() -> i32 {
    16
}
fn default_chunk_height() -> i32 {
    100
}
fn default_draw_radius() -> i32 {
    8
}
fn default_vertical_band() -> i32 {
    2
}
fn default_poll_interval_ms() -> u64 {
    1000
}
impl Default for WorldSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_height: default_chunk_height(),
            draw_radius: default_draw_radius(),
            vertical_band: default_vertical_band(),
            seed_offset: [0, 0],
            poll_interval_ms: default_poll_interval_ms(),
            workers: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Warp {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_warp_amplitude")]
    pub amplitude_x: f32,
    #[serde(default = "default_warp_amplitude")]
    pub amplitude_z: f32,
    #[serde(default = "default_warp_noise_x")]
    pub noise_x: NoiseSettings,
    #[serde(default = "default_warp_noise_z")]
    pub noise_z: NoiseSettings,
}
fn default_true() -> bool {
    true
}
fn default_warp_amplitude() -> f32 {
    20.0
}
fn default_warp_noise_x() -> NoiseSettings {
    NoiseSettings {
        zoom: 0.005,
        octaves: 3,
        offset: [300.0, 1_200.0],
        seed: 11,
        ..NoiseSettings::default()
    }
}
fn default_warp_noise_z() -> NoiseSettings {
    NoiseSettings {
        zoom: 0.005,
        octaves: 3,
        offset: [-1_500.0, 450.0],
        seed: 23,
        ..NoiseSettings::default()
    }
}
impl Default for Warp {
    fn default() -> Self {
        Self {
            enabled: true,
            amplitude_x: default_warp_amplitude(),
            amplitude_z: default_warp_amplitude(),
            noise_x: default_warp_noise_x(),
            noise_z: default_warp_noise_z(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Layers {
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    #[serde(default = "default_surface_block")]
    pub surface_block: BlockType,
    #[serde(default = "default_underground_block")]
    pub underground_block: BlockType,
    #[serde(default = "default_shore_block")]
    pub shore_block: BlockType,
    #[serde(default)]
    pub stone: Stone,
    #[serde(default)]
    pub trunks: Trunks,
}
fn default_water_level() -> i32 {
    10
}
fn default_surface_block() -> BlockType {
    BlockType::Grass
}
fn default_underground_block() -> BlockType {
    BlockType::Dirt
}
fn default_shore_block() -> BlockType {
    BlockType::Sand
}
impl Default for Layers {
    fn default() -> Self {
        Self {
            water_level: default_water_level(),
            surface_block: default_surface_block(),
            underground_block: default_underground_block(),
            shore_block: default_shore_block(),
            stone: Stone::default(),
            trunks: Trunks::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Stone {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_stone_threshold")]
    pub threshold: f32,
    #[serde(default = "default_stone_noise")]
    pub noise: NoiseSettings,
}
fn default_stone_threshold() -> f32 {
    0.5
}
fn default_stone_noise() -> NoiseSettings {
    NoiseSettings {
        zoom: 0.03,
        octaves: 1,
        offset: [2_000.0, -350.0],
        seed: 5,
        ..NoiseSettings::default()
    }
}
impl Default for Stone {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: default_stone_threshold(),
            noise: default_stone_noise(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Trunks {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_trunk_density")]
    pub density: f32,
    #[serde(default = "default_trunk_min")]
    pub min_height: i32,
    #[serde(default = "default_trunk_max")]
    pub max_height: i32,
    #[serde(default = "default_trunk_salt")]
    pub salt: u32,
}
fn default_trunk_density() -> f32 {
    0.02
}
fn default_trunk_min() -> i32 {
    4
}
fn default_trunk_max() -> i32 {
    6
}
fn default_trunk_salt() -> u32 {
    0x7EE5_0A11
}
impl Default for Trunks {
    fn default() -> Self {
        Self {
            enabled: true,
            density: default_trunk_density(),
            min_height: default_trunk_min(),
            max_height: default_trunk_max(),
            salt: default_trunk_salt(),
        }
    }
}

impl WorldGenConfig {
    /// Reads, parses and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: WorldGenConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.chunk_size <= 0 || w.chunk_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk dimensions must be positive, got {}x{}",
                w.chunk_size, w.chunk_height
            )));
        }
        if w.draw_radius < 0 {
            return Err(ConfigError::Invalid(format!(
                "draw_radius must not be negative, got {}",
                w.draw_radius
            )));
        }
        if w.vertical_band < 0 {
            return Err(ConfigError::Invalid(format!(
                "vertical_band must not be negative, got {}",
                w.vertical_band
            )));
        }
        if w.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        let noise = [
            ("terrain", &self.terrain),
            ("warp.noise_x", &self.warp.noise_x),
            ("warp.noise_z", &self.warp.noise_z),
            ("layers.stone.noise", &self.layers.stone.noise),
        ];
        for (name, settings) in noise {
            settings
                .validate()
                .map_err(|reason| ConfigError::Invalid(format!("{name}: {reason}")))?;
        }
        if !(self.warp.amplitude_x.is_finite() && self.warp.amplitude_z.is_finite()) {
            return Err(ConfigError::Invalid("warp amplitudes must be finite".into()));
        }
        let t = &self.layers.trunks;
        if t.min_height < 1 || t.max_height < t.min_height {
            return Err(ConfigError::Invalid(format!(
                "trunk heights must satisfy 1 <= min <= max, got {}..{}",
                t.min_height, t.max_height
            )));
        }
        if !(0.0..=1.0).contains(&t.density) {
            return Err(ConfigError::Invalid(format!(
                "trunk density must be in [0, 1], got {}",
                t.density
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        ChunkDims::new(self.world.chunk_size, self.world.chunk_height)
    }

    #[inline]
    pub fn seed_offset(&self) -> SeedOffset {
        SeedOffset::new(self.world.seed_offset[0], self.world.seed_offset[1])
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.world.poll_interval_ms)
    }
}
