use loam_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Horizontal and vertical extent of every chunk, in voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub size: i32,
    pub height: i32,
}

impl ChunkDims {
    #[inline]
    pub const fn new(size: i32, height: i32) -> Self {
        Self { size, height }
    }

    #[inline]
    pub fn size_usize(self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn height_usize(self) -> usize {
        self.height as usize
    }

    #[inline]
    pub fn voxel_count(self) -> usize {
        self.size_usize() * self.size_usize() * self.height_usize()
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::new(16, 100)
    }
}

/// Per-world translation of every noise field ("map seed").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedOffset {
    pub x: i32,
    pub z: i32,
}

impl SeedOffset {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// World-space origin of a chunk. Components are always multiples of
/// `(size, height, size)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPosition {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the voxel at integer world coordinates.
    #[inline]
    pub fn containing(dims: ChunkDims, wx: i32, wy: i32, wz: i32) -> Self {
        Self {
            x: wx.div_euclid(dims.size) * dims.size,
            y: wy.div_euclid(dims.height) * dims.height,
            z: wz.div_euclid(dims.size) * dims.size,
        }
    }


    /// Steps by whole chunks.
    #[inline]
    pub fn offset_chunks(self, dims: ChunkDims, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx * dims.size,
            y: self.y + dy * dims.height,
            z: self.z + dz * dims.size,
        }
    }

    #[inline]
    pub fn is_aligned(self, dims: ChunkDims) -> bool {
        self.x.rem_euclid(dims.size) == 0
            && self.y.rem_euclid(dims.height) == 0
            && self.z.rem_euclid(dims.size) == 0
    }

    #[inline]
    pub fn origin(self) -> Vec3 {
        Vec3::from_i32(self.x, self.y, self.z)
    }

    #[inline]
    pub fn distance_to(self, p: Vec3) -> f32 {
        self.origin().distance(p)
    }
}

impl From<(i32, i32, i32)> for ChunkPosition {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkPosition> for (i32, i32, i32) {
    fn from(value: ChunkPosition) -> Self {
        (value.x, value.y, value.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDims = ChunkDims::new(16, 100);

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(
            ChunkPosition::containing(DIMS, -1, -1, -1),
            ChunkPosition::new(-16, -100, -16)
        );
        assert_eq!(
            ChunkPosition::containing(DIMS, 15, 99, 16),
            ChunkPosition::new(0, 0, 16)
        );
    }

    #[test]
    fn offset_chunks_scales_by_dims() {
        let p = ChunkPosition::new(16, 0, -32);
        assert_eq!(
            p.offset_chunks(DIMS, -1, -2, 1),
            ChunkPosition::new(0, -200, -16)
        );
    }
}
