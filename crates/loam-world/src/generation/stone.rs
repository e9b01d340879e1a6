use loam_blocks::BlockType;

use super::layers::{BlockLayer, ColumnContext};
use crate::chunk::ChunkData;
use crate::noise::{NoiseField, NoiseSettings};

/// Turns noise-selected columns into stone from the chunk base up to the
/// surface. Chunks entirely below y = 0 are filled through their full height.
#[derive(Debug)]
pub struct StoneLayer {
    noise: NoiseField,
    threshold: f32,
}

impl StoneLayer {
    pub fn new(noise: NoiseSettings, threshold: f32) -> Self {
        Self {
            noise: NoiseField::new(noise),
            threshold,
        }
    }
}

impl BlockLayer for StoneLayer {
    fn name(&self) -> &'static str {
        "stone"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        let base_y = chunk.position().y;
        if base_y > c.surface_height {
            return false;
        }
        let (wx, _, wz) = chunk.local_to_world(c.x, 0, c.z);
        let value = self.noise.sample(wx as f32, wz as f32, c.seed_offset);
        if value <= self.threshold {
            return false;
        }
        let top = if base_y < 0 {
            base_y + chunk.dims().height - 1
        } else {
            c.surface_height
        };
        for y in base_y..=top {
            chunk.set_column(c.x, y, c.z, BlockType::Stone);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_position::{ChunkDims, ChunkPosition, SeedOffset};

    fn ctx(surface_height: i32) -> ColumnContext {
        ColumnContext {
            x: 0,
            y: 0,
            z: 0,
            surface_height,
            seed_offset: SeedOffset::default(),
        }
    }

    #[test]
    fn zero_threshold_always_fires_up_to_surface() {
        let layer = StoneLayer::new(NoiseSettings::default(), -1.0);
        let mut c = ChunkData::new(ChunkPosition::new(0, 0, 0), ChunkDims::new(2, 10));
        assert!(layer.handle(&mut c, &ctx(4)));
        for y in 0..=4 {
            assert_eq!(c.get_local(0, y, 0), BlockType::Stone);
        }
        assert_eq!(c.get_local(0, 5, 0), BlockType::Air);
    }

    #[test]
    fn below_zero_fills_whole_chunk() {
        let layer = StoneLayer::new(NoiseSettings::default(), -1.0);
        let mut c = ChunkData::new(ChunkPosition::new(0, -10, 0), ChunkDims::new(2, 10));
        assert!(layer.handle(&mut c, &ctx(4)));
        for y in 0..10 {
            assert_eq!(c.get_local(0, y, 0), BlockType::Stone);
        }
    }

    #[test]
    fn chunk_above_surface_is_untouched() {
        let layer = StoneLayer::new(NoiseSettings::default(), -1.0);
        let mut c = ChunkData::new(ChunkPosition::new(0, 10, 0), ChunkDims::new(2, 10));
        assert!(!layer.handle(&mut c, &ctx(4)));
        assert!(!c.has_non_air());
    }

    #[test]
    fn threshold_above_one_never_fires() {
        let layer = StoneLayer::new(NoiseSettings::default(), 1.0);
        let mut c = ChunkData::new(ChunkPosition::new(0, 0, 0), ChunkDims::new(2, 10));
        assert!(!layer.handle(&mut c, &ctx(4)));
    }
}
