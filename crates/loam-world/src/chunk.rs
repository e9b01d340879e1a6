use loam_blocks::BlockType;

use crate::chunk_position::{ChunkDims, ChunkPosition};

/// World-space voxel reads. Anything outside the loaded data reads as
/// [`BlockType::Nothing`].
pub trait BlockLookup {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> BlockType;
}

/// Dense voxel contents of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    position: ChunkPosition,
    dims: ChunkDims,
    blocks: Vec<BlockType>,
    modified_by_player: bool,
    revision: u64,
}

impl ChunkData {
    /// All-air chunk at `position`.
    pub fn new(position: ChunkPosition, dims: ChunkDims) -> Self {
        Self {
            position,
            dims,
            blocks: vec![BlockType::Air; dims.voxel_count()],
            modified_by_player: false,
            revision: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        let size = self.dims.size_usize();
        (y * size + z) * size + x
    }

    #[inline]
    pub fn in_bounds(&self, lx: i32, ly: i32, lz: i32) -> bool {
        (0..self.dims.size).contains(&lx)
            && (0..self.dims.height).contains(&ly)
            && (0..self.dims.size).contains(&lz)
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        let i = self.idx(x, y, z);
        self.blocks[i] = block;
    }

    /// Writes into column `(x, z)` at world height `wy`. Heights outside the
    /// chunk are ignored; returns whether the write landed.
    #[inline]
    pub fn set_column(&mut self, x: usize, wy: i32, z: usize, block: BlockType) -> bool {
        let ly = wy - self.position.y;
        if !(0..self.dims.height).contains(&ly) {
            return false;
        }
        self.set_local(x, ly as usize, z, block);
        true
    }

    /// Reads column `(x, z)` at world height `wy`.
    #[inline]
    pub fn get_column(&self, x: usize, wy: i32, z: usize) -> Option<BlockType> {
        let ly = wy - self.position.y;
        if !(0..self.dims.height).contains(&ly) {
            return None;
        }
        Some(self.get_local(x, ly as usize, z))
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        self.in_bounds(
            wx - self.position.x,
            wy - self.position.y,
            wz - self.position.z,
        )
    }

    #[inline]
    pub fn world_to_local(&self, wx: i32, wy: i32, wz: i32) -> Option<(usize, usize, usize)> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        Some((
            (wx - self.position.x) as usize,
            (wy - self.position.y) as usize,
            (wz - self.position.z) as usize,
        ))
    }

    #[inline]
    pub fn local_to_world(&self, x: usize, y: usize, z: usize) -> (i32, i32, i32) {
        (
            self.position.x + x as i32,
            self.position.y + y as i32,
            self.position.z + z as i32,
        )
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockType> {
        let (x, y, z) = self.world_to_local(wx, wy, wz)?;
        Some(self.get_local(x, y, z))
    }

    /// Player edit: writes the voxel, marks the chunk as player-modified and
    /// bumps the revision.
    pub fn apply_edit(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        self.set_local(x, y, z, block);
        self.modified_by_player = true;
        self.revision = self.revision.wrapping_add(1);
    }

    #[inline]
    pub fn is_modified_by_player(&self) -> bool {
        self.modified_by_player
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| *b != BlockType::Air)
    }

    /// Topmost solid voxel of column `(x, z)` in world y.
    pub fn top_solid_in_column(&self, x: usize, z: usize) -> Option<i32> {
        (0..self.dims.height_usize())
            .rev()
            .find(|&y| self.get_local(x, y, z).is_solid())
            .map(|y| self.position.y + y as i32)
    }
}

impl BlockLookup for ChunkData {
    #[inline]
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> BlockType {
        self.get_world(wx, wy, wz).unwrap_or(BlockType::Nothing)
    }
}
