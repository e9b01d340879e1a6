use loam_blocks::BlockType;

use super::layers::{BlockLayer, ColumnContext};
use crate::chunk::ChunkData;

/// Places a bare trunk on hash-selected grass columns above the water line.
#[derive(Clone, Debug)]
pub struct TrunkLayer {
    pub water_level: i32,
    pub density: f32,
    pub min_height: i32,
    pub max_height: i32,
    pub salt: u32,
}

impl TrunkLayer {
    /// Trunk height for world column `(wx, wz)` or `None` when the column is
    /// not selected.
    pub fn trunk_height(&self, wx: i32, wz: i32, seed: u32) -> Option<i32> {
        if rand01_trunk(seed, wx, wz, self.salt) >= self.density {
            return None;
        }
        let span = (self.max_height - self.min_height + 1).max(1) as u32;
        let h = hash2_trunk(wx, wz, seed ^ self.salt.rotate_left(7));
        Some(self.min_height + (h % span) as i32)
    }
}

impl BlockLayer for TrunkLayer {
    fn name(&self) -> &'static str {
        "trunks"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        if c.surface_height <= self.water_level {
            return false;
        }
        if chunk.get_column(c.x, c.surface_height, c.z) != Some(BlockType::Grass) {
            return false;
        }
        let (wx, _, wz) = chunk.local_to_world(c.x, 0, c.z);
        let seed = column_seed(c.seed_offset.x, c.seed_offset.z);
        let Some(height) = self.trunk_height(wx, wz, seed) else {
            return false;
        };
        for y in c.surface_height + 1..=c.surface_height + height {
            chunk.set_column(c.x, y, c.z, BlockType::TreeTrunk);
        }
        true
    }
}

#[inline]
fn column_seed(ox: i32, oz: i32) -> u32 {
    (ox as u32).wrapping_mul(0x9E37_79B9) ^ (oz as u32).wrapping_mul(0x632B_E5AB)
}

fn hash2_trunk(ix: i32, iz: i32, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b)
        ^ (iz as u32).wrapping_mul(0xc2b2_ae35)
        ^ seed.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

fn rand01_trunk(world_seed: u32, ix: i32, iz: i32, salt: u32) -> f32 {
    let h = hash2_trunk(ix, iz, (world_seed ^ salt).wrapping_add(0x9E37_79B9));
    ((h & 0x00FF_FFFF) as f32) / 16_777_216.0
}
