//! Column-based terrain generation driven by a configurable layer chain.

mod layers;
mod stone;
mod trunks;

pub use layers::{AirLayer, BlockLayer, ColumnContext, SurfaceLayer, UndergroundLayer, WaterLayer};
pub use stone::StoneLayer;
pub use trunks::TrunkLayer;

use crate::chunk::ChunkData;
use crate::chunk_position::{ChunkDims, ChunkPosition, SeedOffset};
use crate::noise::{DomainWarping, NoiseField, NoiseSettings, redistribution, remap01_to_int};
use crate::worldgen::WorldGenConfig;

/// Surface height sampling plus the layer chain that fills one column.
pub struct BiomeGenerator {
    terrain: NoiseField,
    warping: Option<DomainWarping>,
    start_layers: Vec<Box<dyn BlockLayer>>,
    additional_layers: Vec<Box<dyn BlockLayer>>,
}

impl std::fmt::Debug for BiomeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeGenerator")
            .field("terrain", &self.terrain)
            .field("warping", &self.warping.is_some())
            .field("start_layers", &layer_names(&self.start_layers))
            .field("additional_layers", &layer_names(&self.additional_layers))
            .finish()
    }
}

fn layer_names(layers: &[Box<dyn BlockLayer>]) -> Vec<&'static str> {
    layers.iter().map(|l| l.name()).collect()
}

impl BiomeGenerator {
    /// Generator without any layers; columns stay air until layers are added.
    pub fn new(terrain: NoiseSettings) -> Self {
        Self {
            terrain: NoiseField::new(terrain),
            warping: None,
            start_layers: Vec::new(),
            additional_layers: Vec::new(),
        }
    }

    pub fn with_warping(mut self, warping: DomainWarping) -> Self {
        self.warping = Some(warping);
        self
    }

    pub fn with_start_layer(mut self, layer: impl BlockLayer + 'static) -> Self {
        self.start_layers.push(Box::new(layer));
        self
    }

    pub fn with_additional_layer(mut self, layer: impl BlockLayer + 'static) -> Self {
        self.additional_layers.push(Box::new(layer));
        self
    }

    /// Standard chain: water, surface, air, underground; then stone and
    /// trunks when enabled.
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        let layers = &cfg.layers;
        let mut biome = Self::new(cfg.terrain.clone())
            .with_start_layer(WaterLayer {
                water_level: layers.water_level,
                shore: layers.shore_block,
            })
            .with_start_layer(SurfaceLayer {
                block: layers.surface_block,
            })
            .with_start_layer(AirLayer)
            .with_start_layer(UndergroundLayer {
                block: layers.underground_block,
            });
        if cfg.warp.enabled {
            biome = biome.with_warping(DomainWarping::new(
                cfg.warp.noise_x.clone(),
                cfg.warp.noise_z.clone(),
                cfg.warp.amplitude_x,
                cfg.warp.amplitude_z,
            ));
        }
        if layers.stone.enabled {
            biome = biome.with_additional_layer(StoneLayer::new(
                layers.stone.noise.clone(),
                layers.stone.threshold,
            ));
        }
        if layers.trunks.enabled {
            biome = biome.with_additional_layer(TrunkLayer {
                water_level: layers.water_level,
                density: layers.trunks.density,
                min_height: layers.trunks.min_height,
                max_height: layers.trunks.max_height,
                salt: layers.trunks.salt,
            });
        }
        biome
    }

    #[inline]
    pub fn terrain(&self) -> &NoiseField {
        &self.terrain
    }

    /// Raw terrain value at a world column, warped when configured.
    #[inline]
    pub fn terrain_value(&self, wx: i32, wz: i32, seed_offset: SeedOffset) -> f32 {
        let (x, z) = (wx as f32, wz as f32);
        match &self.warping {
            Some(w) => w.sample(x, z, &self.terrain, seed_offset),
            None => self.terrain.sample(x, z, seed_offset),
        }
    }

    /// Surface height of a world column, always inside `[0, chunk_height)`.
    pub fn surface_height(
        &self,
        wx: i32,
        wz: i32,
        chunk_height: i32,
        seed_offset: SeedOffset,
    ) -> i32 {
        let v = self.terrain_value(wx, wz, seed_offset);
        let v = redistribution(v, self.terrain.settings());
        remap01_to_int(v, 0.0, chunk_height as f32).clamp(0, chunk_height - 1)
    }

    /// Fills column `(x, z)` of `chunk`.
    pub fn process_column(&self, chunk: &mut ChunkData, x: usize, z: usize, seed_offset: SeedOffset) {
        let (wx, base_y, wz) = chunk.local_to_world(x, 0, z);
        let height = chunk.dims().height;
        let surface_height = self.surface_height(wx, wz, height, seed_offset);
        let mut column = ColumnContext {
            x,
            y: base_y,
            z,
            surface_height,
            seed_offset,
        };
        for y in base_y..base_y + height {
            column.y = y;
            for layer in &self.start_layers {
                if layer.handle(chunk, &column) {
                    break;
                }
            }
        }
        column.y = base_y;
        for layer in &self.additional_layers {
            layer.handle(chunk, &column);
        }
    }
}

/// Produces complete chunks for a fixed chunk shape and world offset.
#[derive(Debug)]
pub struct TerrainGenerator {
    biome: BiomeGenerator,
    dims: ChunkDims,
    seed_offset: SeedOffset,
}

impl TerrainGenerator {
    pub fn new(biome: BiomeGenerator, dims: ChunkDims, seed_offset: SeedOffset) -> Self {
        Self {
            biome,
            dims,
            seed_offset,
        }
    }

    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        Self::new(BiomeGenerator::from_config(cfg), cfg.dims(), cfg.seed_offset())
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn seed_offset(&self) -> SeedOffset {
        self.seed_offset
    }

    #[inline]
    pub fn biome(&self) -> &BiomeGenerator {
        &self.biome
    }

    pub fn generate_chunk(&self, position: ChunkPosition) -> ChunkData {
        let mut chunk = ChunkData::new(position, self.dims);
        let size = self.dims.size_usize();
        for z in 0..size {
            for x in 0..size {
                self.biome.process_column(&mut chunk, x, z, self.seed_offset);
            }
        }
        log::trace!(
            target: "stream",
            "[gen] chunk ({},{},{}) populated={}",
            position.x,
            position.y,
            position.z,
            chunk.has_non_air()
        );
        chunk
    }

    /// Generated surface height of a world column.
    #[inline]
    pub fn surface_height_at(&self, wx: i32, wz: i32) -> i32 {
        self.biome
            .surface_height(wx, wz, self.dims.height, self.seed_offset)
    }
}

#[cfg(test)]
mod tests {
    use loam_blocks::BlockType;

    use super::*;

    fn flat_generator() -> TerrainGenerator {
        let mut cfg = WorldGenConfig::default();
        cfg.world.chunk_size = 8;
        cfg.world.chunk_height = 32;
        cfg.warp.enabled = false;
        cfg.layers.stone.enabled = false;
        cfg.layers.trunks.enabled = false;
        cfg.layers.water_level = -1;
        TerrainGenerator::from_config(&cfg)
    }

    #[test]
    fn column_is_dirt_then_grass_then_air() {
        let generator = flat_generator();
        let chunk = generator.generate_chunk(ChunkPosition::new(0, 0, 0));
        for (x, z) in [(0usize, 0usize), (3, 5), (7, 7)] {
            let (wx, _, wz) = chunk.local_to_world(x, 0, z);
            let surface = generator.surface_height_at(wx, wz);
            assert!((0..32).contains(&surface));
            for y in 0..32 {
                let expected = match y.cmp(&surface) {
                    std::cmp::Ordering::Less => BlockType::Dirt,
                    std::cmp::Ordering::Equal => BlockType::Grass,
                    std::cmp::Ordering::Greater => BlockType::Air,
                };
                assert_eq!(chunk.get_column(x, y, z), Some(expected), "y={y}");
            }
        }
    }

    #[test]
    fn chunks_above_and_below_the_surface_band() {
        let generator = flat_generator();
        let above = generator.generate_chunk(ChunkPosition::new(0, 32, 0));
        assert!(!above.has_non_air());
        let below = generator.generate_chunk(ChunkPosition::new(0, -32, 0));
        assert!(below.blocks().iter().all(|b| *b == BlockType::Dirt));
    }

    #[test]
    fn water_sits_on_sand() {
        let mut cfg = WorldGenConfig::default();
        cfg.world.chunk_size = 8;
        cfg.world.chunk_height = 32;
        cfg.layers.stone.enabled = false;
        cfg.layers.trunks.enabled = false;
        cfg.layers.water_level = 31;
        let generator = TerrainGenerator::from_config(&cfg);
        let chunk = generator.generate_chunk(ChunkPosition::new(0, 0, 0));
        let (wx, _, wz) = chunk.local_to_world(2, 0, 2);
        let surface = generator.surface_height_at(wx, wz);
        if surface < 31 {
            assert_eq!(chunk.get_column(2, surface, 2), Some(BlockType::Sand));
            assert_eq!(chunk.get_column(2, 31, 2), Some(BlockType::Water));
        }
    }

    #[test]
    fn empty_chain_leaves_air() {
        let generator = TerrainGenerator::new(
            BiomeGenerator::new(NoiseSettings::default()),
            ChunkDims::new(4, 8),
            SeedOffset::default(),
        );
        assert!(!generator.generate_chunk(ChunkPosition::default()).has_non_air());
    }
}
