//! Face-culling chunk mesher producing flat vertex streams.
#![forbid(unsafe_code)]

mod face;
mod mesh_build;

pub use face::Face;
pub use mesh_build::MeshBuild;

use loam_blocks::BlockType;
use loam_geom::Vec3;
use loam_world::{BlockLookup, ChunkData, ChunkPosition};

/// Renderable payload of one chunk. Vertex positions are local to the chunk
/// origin; voxel `(x, y, z)` spans `[x - 0.5, x + 0.5]` on each axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub position: ChunkPosition,
    /// Chunk revision the mesh was built from.
    pub revision: u64,
    pub solid: MeshBuild,
    pub water: MeshBuild,
}

impl ChunkMesh {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.solid.quad_count() + self.water.quad_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.water.is_empty()
    }
}

pub fn block_color(block: BlockType) -> [u8; 4] {
    match block {
        BlockType::Grass => [96, 168, 64, 255],
        BlockType::Dirt => [121, 85, 58, 255],
        BlockType::Stone => [128, 128, 128, 255],
        BlockType::Sand => [219, 207, 142, 255],
        BlockType::Water => [48, 96, 200, 160],
        BlockType::TreeTrunk => [102, 76, 40, 255],
        BlockType::TreeLeaves => [56, 118, 29, 255],
        BlockType::Nothing | BlockType::Air => [0, 0, 0, 0],
    }
}

const HALF: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Emits every visible voxel face of `chunk`. Voxels across the chunk border
/// are read through `neighbors`; unloaded space hides faces.
pub fn build_chunk_mesh(chunk: &ChunkData, neighbors: &impl BlockLookup) -> ChunkMesh {
    let dims = chunk.dims();
    let (sx, sy) = (dims.size, dims.height);
    let mut mesh = ChunkMesh {
        position: chunk.position(),
        revision: chunk.revision(),
        ..ChunkMesh::default()
    };
    for y in 0..sy {
        for z in 0..sx {
            for x in 0..sx {
                let block = chunk.get_local(x as usize, y as usize, z as usize);
                if !block.is_solid() && !block.is_liquid() {
                    continue;
                }
                let origin = Vec3::from_i32(x, y, z) - HALF;
                let target = if block.is_liquid() {
                    &mut mesh.water
                } else {
                    &mut mesh.solid
                };
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    let neighbor = if chunk.in_bounds(nx, ny, nz) {
                        chunk.get_local(nx as usize, ny as usize, nz as usize)
                    } else {
                        let (wx, wy, wz) = chunk.local_to_world(0, 0, 0);
                        neighbors.block_at(wx + nx, wy + ny, wz + nz)
                    };
                    if block.shows_face_against(neighbor) {
                        target.add_face(face, origin, block_color(block));
                    }
                }
            }
        }
    }
    log::trace!(
        target: "stream",
        "[mesh] chunk ({},{},{}) rev={} quads={}",
        mesh.position.x,
        mesh.position.y,
        mesh.position.z,
        mesh.revision,
        mesh.quad_count()
    );
    mesh
}

/// Lookup that treats everything outside the chunk as unloaded.
pub struct Isolated;

impl BlockLookup for Isolated {
    #[inline]
    fn block_at(&self, _wx: i32, _wy: i32, _wz: i32) -> BlockType {
        BlockType::Nothing
    }
}
