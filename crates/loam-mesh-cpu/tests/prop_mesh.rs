use loam_blocks::BlockType;
use loam_mesh_cpu::{Isolated, build_chunk_mesh};
use loam_world::{ChunkData, ChunkDims, ChunkPosition};
use proptest::prelude::*;

fn block() -> impl Strategy<Value = BlockType> {
    prop_oneof![
        Just(BlockType::Air),
        Just(BlockType::Stone),
        Just(BlockType::Dirt),
        Just(BlockType::Water),
    ]
}

fn filled_chunk() -> impl Strategy<Value = ChunkData> {
    prop::collection::vec(block(), 3 * 3 * 3).prop_map(|blocks| {
        let mut c = ChunkData::new(ChunkPosition::new(0, 0, 0), ChunkDims::new(3, 3));
        for (i, b) in blocks.into_iter().enumerate() {
            c.set_local(i % 3, i / 9, (i / 3) % 3, b);
        }
        c
    })
}

proptest! {
    // A voxel never emits more than six faces
    #[test]
    fn quads_bounded_by_visible_voxels(c in filled_chunk()) {
        let mesh = build_chunk_mesh(&c, &Isolated);
        let solid = c.blocks().iter().filter(|b| b.is_solid()).count();
        let water = c.blocks().iter().filter(|b| b.is_liquid()).count();
        prop_assert!(mesh.solid.quad_count() <= solid * 6);
        prop_assert!(mesh.water.quad_count() <= water * 6);
    }

    // Streams stay consistent: 4 vertices and 6 indices per quad
    #[test]
    fn stream_lengths_consistent(c in filled_chunk()) {
        let mesh = build_chunk_mesh(&c, &Isolated);
        for m in [&mesh.solid, &mesh.water] {
            let q = m.quad_count();
            prop_assert_eq!(m.pos.len(), q * 12);
            prop_assert_eq!(m.norm.len(), q * 12);
            prop_assert_eq!(m.uv.len(), q * 8);
            prop_assert_eq!(m.col.len(), q * 16);
            prop_assert!(m.idx.iter().all(|&i| (i as usize) < m.vertex_count()));
        }
    }

    // Meshing is a pure function of the voxels
    #[test]
    fn meshing_deterministic(c in filled_chunk()) {
        prop_assert_eq!(build_chunk_mesh(&c, &Isolated), build_chunk_mesh(&c, &Isolated));
    }
}
