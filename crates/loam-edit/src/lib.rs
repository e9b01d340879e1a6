//! Voxel edit helpers: resolving a raycast hit to a voxel and finding the
//! chunks whose meshes an edit touches.
#![forbid(unsafe_code)]

use loam_geom::Vec3;
use loam_world::{ChunkDims, ChunkPosition};

/// Surface hit reported by the interaction layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    pub point: Vec3,
    pub normal: Vec3,
}

impl RaycastHit {
    #[inline]
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    #[inline]
    pub fn block_position(&self) -> (i32, i32, i32) {
        block_position_from_hit(self.point, self.normal)
    }
}

/// Voxel hit by a ray. Voxels are centered on integer coordinates, so a hit
/// on a face has a `.5` component along the face normal; stepping half a
/// normal inward moves it into the hit voxel.
pub fn block_position_from_hit(point: Vec3, normal: Vec3) -> (i32, i32, i32) {
    (
        resolve_axis(point.x, normal.x),
        resolve_axis(point.y, normal.y),
        resolve_axis(point.z, normal.z),
    )
}

#[inline]
fn resolve_axis(p: f32, n: f32) -> i32 {
    let p = if (p % 1.0).abs() == 0.5 { p - n / 2.0 } else { p };
    // Ties to even keeps the result stable on edges where the normal is zero.
    p.round_ties_even() as i32
}

/// Where a world voxel lives: owning chunk plus local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EditTarget {
    pub world: (i32, i32, i32),
    pub chunk: ChunkPosition,
    pub local: (usize, usize, usize),
}

impl EditTarget {
    pub fn resolve(dims: ChunkDims, wx: i32, wy: i32, wz: i32) -> Self {
        let chunk = ChunkPosition::containing(dims, wx, wy, wz);
        Self {
            world: (wx, wy, wz),
            chunk,
            local: (
                (wx - chunk.x) as usize,
                (wy - chunk.y) as usize,
                (wz - chunk.z) as usize,
            ),
        }
    }
}

/// Chunks sharing the face, edge or corner that `local` lies on, excluding
/// `position` itself. Sorted by position.
pub fn boundary_neighbors(
    dims: ChunkDims,
    position: ChunkPosition,
    local: (usize, usize, usize),
) -> Vec<ChunkPosition> {
    let (lx, ly, lz) = (local.0 as i32, local.1 as i32, local.2 as i32);
    let steps = |l: i32, max: i32| -> Vec<i32> {
        let mut v = vec![0];
        if l == 0 {
            v.push(-1);
        }
        if l == max - 1 {
            v.push(1);
        }
        v
    };
    let (xs, ys, zs) = (
        steps(lx, dims.size),
        steps(ly, dims.height),
        steps(lz, dims.size),
    );

    let mut out = Vec::new();
    for &dx in &xs {
        for &dy in &ys {
            for &dz in &zs {
                if (dx, dy, dz) == (0, 0, 0) {
                    continue;
                }
                let p = position.offset_chunks(dims, dx, dy, dz);
                if !out.contains(&p) {
                    out.push(p);
                }
            }
        }
    }
    out.sort_unstable();
    out
}
