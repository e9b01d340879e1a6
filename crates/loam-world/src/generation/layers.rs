use loam_blocks::BlockType;

use crate::chunk::ChunkData;
use crate::chunk_position::SeedOffset;

/// Column handed to a [`BlockLayer`]: local `(x, z)`, the world height `y`
/// being decided and the column's surface height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnContext {
    pub x: usize,
    pub y: i32,
    pub z: usize,
    pub surface_height: i32,
    pub seed_offset: SeedOffset,
}

/// One rule of the layer chain. Returns `true` when it claimed the voxel.
///
/// Implementations may only write voxels of column `(x, z)` and only inside
/// the chunk.
pub trait BlockLayer: Send + Sync {
    fn name(&self) -> &'static str;
    fn handle(&self, chunk: &mut ChunkData, column: &ColumnContext) -> bool;
}

/// Fills between the surface and the water level; the submerged surface voxel
/// turns into shore material.
#[derive(Clone, Debug)]
pub struct WaterLayer {
    pub water_level: i32,
    pub shore: BlockType,
}

impl BlockLayer for WaterLayer {
    fn name(&self) -> &'static str {
        "water"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        if c.y <= c.surface_height || c.y > self.water_level {
            return false;
        }
        chunk.set_column(c.x, c.y, c.z, BlockType::Water);
        if c.y == c.surface_height + 1 {
            chunk.set_column(c.x, c.surface_height, c.z, self.shore);
        }
        true
    }
}

#[derive(Clone, Debug)]
pub struct SurfaceLayer {
    pub block: BlockType,
}

impl BlockLayer for SurfaceLayer {
    fn name(&self) -> &'static str {
        "surface"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        if c.y != c.surface_height {
            return false;
        }
        chunk.set_column(c.x, c.y, c.z, self.block);
        true
    }
}

#[derive(Clone, Debug, Default)]
pub struct AirLayer;

impl BlockLayer for AirLayer {
    fn name(&self) -> &'static str {
        "air"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        if c.y <= c.surface_height {
            return false;
        }
        chunk.set_column(c.x, c.y, c.z, BlockType::Air);
        true
    }
}

#[derive(Clone, Debug)]
pub struct UndergroundLayer {
    pub block: BlockType,
}

impl BlockLayer for UndergroundLayer {
    fn name(&self) -> &'static str {
        "underground"
    }

    fn handle(&self, chunk: &mut ChunkData, c: &ColumnContext) -> bool {
        if c.y >= c.surface_height {
            return false;
        }
        chunk.set_column(c.x, c.y, c.z, self.block);
        true
    }
}
