use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use loam_blocks::BlockType;
use loam_world::{BlockLookup, ChunkData, ChunkDims, ChunkPosition};

use crate::error::StoreError;

/// Face-neighbor steps in chunk units: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Key sets of a store at one instant, detached from the chunk data so the
/// planner can run off the owning thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Loaded data positions with their `modified_by_player` flag.
    pub data: HashMap<ChunkPosition, bool>,
    pub render: HashSet<ChunkPosition>,
}

/// A chunk plus whichever of its six face neighbors were loaded when the
/// neighborhood was captured.
#[derive(Clone, Debug)]
pub struct Neighborhood {
    pub center: Arc<ChunkData>,
    pub neighbors: [Option<Arc<ChunkData>>; 6],
}

impl Neighborhood {
    #[inline]
    pub fn position(&self) -> ChunkPosition {
        self.center.position()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.center.revision()
    }
}

impl BlockLookup for Neighborhood {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> BlockType {
        if let Some(b) = self.center.get_world(wx, wy, wz) {
            return b;
        }
        self.neighbors
            .iter()
            .flatten()
            .find_map(|n| n.get_world(wx, wy, wz))
            .unwrap_or(BlockType::Nothing)
    }
}

/// Chunk data (wide radius) and render handles (narrow radius), keyed by
/// chunk position. Every render key has a data key.
#[derive(Debug)]
pub struct WorldDataStore<H> {
    dims: ChunkDims,
    data: HashMap<ChunkPosition, Arc<ChunkData>>,
    render: HashMap<ChunkPosition, H>,
}

impl<H> WorldDataStore<H> {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            data: HashMap::new(),
            render: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Adds freshly generated data. Never overwrites an existing entry.
    pub fn insert(&mut self, pos: ChunkPosition, data: Arc<ChunkData>) -> Result<(), StoreError> {
        debug_assert_eq!(pos, data.position());
        if self.data.contains_key(&pos) {
            return Err(StoreError::DuplicateData(pos));
        }
        self.data.insert(pos, data);
        Ok(())
    }

    #[inline]
    pub fn get(&self, pos: ChunkPosition) -> Option<&Arc<ChunkData>> {
        self.data.get(&pos)
    }

    /// Exclusive access for edits. Clones the voxel array first if a worker
    /// still holds the shared copy.
    #[inline]
    pub fn get_mut(&mut self, pos: ChunkPosition) -> Option<&mut ChunkData> {
        self.data.get_mut(&pos).map(Arc::make_mut)
    }

    #[inline]
    pub fn contains_data(&self, pos: ChunkPosition) -> bool {
        self.data.contains_key(&pos)
    }

    #[inline]
    pub fn contains_render(&self, pos: ChunkPosition) -> bool {
        self.render.contains_key(&pos)
    }

    #[inline]
    pub fn render_handle(&self, pos: ChunkPosition) -> Option<&H> {
        self.render.get(&pos)
    }

    /// Position of the chunk that would contain world voxel `(wx, wy, wz)`.
    #[inline]
    pub fn chunk_position_for(&self, wx: i32, wy: i32, wz: i32) -> ChunkPosition {
        ChunkPosition::containing(self.dims, wx, wy, wz)
    }

    /// Drops chunk data. Player-modified chunks and chunks that still have a
    /// bound render handle are refused. Returns `Ok(None)` when nothing was
    /// loaded at `pos`.
    pub fn remove_data(&mut self, pos: ChunkPosition) -> Result<Option<Arc<ChunkData>>, StoreError> {
        let Some(chunk) = self.data.get(&pos) else {
            return Ok(None);
        };
        if chunk.is_modified_by_player() {
            return Err(StoreError::ProtectedChunk(pos));
        }
        if self.render.contains_key(&pos) {
            return Err(StoreError::RenderStillBound(pos));
        }
        Ok(self.data.remove(&pos))
    }

    #[inline]
    pub fn remove_render(&mut self, pos: ChunkPosition) -> Option<H> {
        self.render.remove(&pos)
    }

    /// Associates a render handle with loaded data.
    pub fn bind(&mut self, pos: ChunkPosition, handle: H) -> Result<(), StoreError> {
        if !self.data.contains_key(&pos) {
            return Err(StoreError::MissingData(pos));
        }
        if self.render.contains_key(&pos) {
            return Err(StoreError::DuplicateRender(pos));
        }
        self.render.insert(pos, handle);
        Ok(())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            data: self
                .data
                .iter()
                .map(|(p, c)| (*p, c.is_modified_by_player()))
                .collect(),
            render: self.render.keys().copied().collect(),
        }
    }

    /// Shares `pos` and its loaded face neighbors for off-thread meshing.
    pub fn neighborhood(&self, pos: ChunkPosition) -> Option<Neighborhood> {
        let center = Arc::clone(self.data.get(&pos)?);
        let neighbors = FACE_NEIGHBORS.map(|(dx, dy, dz)| {
            self.data
                .get(&pos.offset_chunks(self.dims, dx, dy, dz))
                .map(Arc::clone)
        });
        Some(Neighborhood { center, neighbors })
    }

    pub fn data_positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.data.keys().copied()
    }

    pub fn render_positions(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.render.keys().copied()
    }

    #[inline]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Removes everything, player-modified chunks included, and hands the
    /// render handles back for disposal.
    pub fn teardown(&mut self) -> Vec<(ChunkPosition, H)> {
        self.data.clear();
        self.render.drain().collect()
    }
}

impl<H> BlockLookup for WorldDataStore<H> {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> BlockType {
        let pos = self.chunk_position_for(wx, wy, wz);
        self.data
            .get(&pos)
            .and_then(|c| c.get_world(wx, wy, wz))
            .unwrap_or(BlockType::Nothing)
    }
}
