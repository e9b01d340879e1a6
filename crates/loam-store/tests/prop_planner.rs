use hashbrown::HashSet;
use loam_geom::Vec3;
use loam_store::{StoreSnapshot, StreamRadius, plan_streaming};
use loam_world::{ChunkDims, ChunkPosition};
use proptest::prelude::*;

const DIMS: ChunkDims = ChunkDims::new(16, 100);

fn observer() -> impl Strategy<Value = Vec3> {
    (-500.0f32..500.0, -300.0f32..300.0, -500.0f32..500.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Loaded chunks scattered around the origin, some player-modified, some
/// with render handles.
fn snapshot() -> impl Strategy<Value = StoreSnapshot> {
    prop::collection::vec(
        (-12i32..12, -3i32..2, -12i32..12, any::<bool>(), any::<bool>()),
        0..80,
    )
    .prop_map(|entries| {
        let mut s = StoreSnapshot::default();
        for (cx, cy, cz, modified, rendered) in entries {
            let p = ChunkPosition::new(cx * DIMS.size, cy * DIMS.height, cz * DIMS.size);
            s.data.insert(p, modified);
            if rendered {
                s.render.insert(p);
            }
        }
        s
    })
}

fn radius() -> impl Strategy<Value = StreamRadius> {
    (0i32..4, 0i32..3).prop_map(|(draw_radius, vertical_band)| StreamRadius {
        draw_radius,
        vertical_band,
    })
}

proptest! {
    // Nothing is both created and removed
    #[test]
    fn create_and_remove_are_disjoint(s in snapshot(), o in observer(), r in radius()) {
        let plan = plan_streaming(&s, o, DIMS, r);
        let data_remove: HashSet<_> = plan.data_to_remove.iter().collect();
        let render_remove: HashSet<_> = plan.render_to_remove.iter().collect();
        prop_assert!(plan.data_to_create.iter().all(|p| !data_remove.contains(p)));
        prop_assert!(plan.render_to_create.iter().all(|p| !render_remove.contains(p)));
    }

    // Data always covers what is rendered
    #[test]
    fn needed_data_is_superset_of_render(o in observer(), r in radius()) {
        let plan = plan_streaming(&StoreSnapshot::default(), o, DIMS, r);
        prop_assert!(plan.needed_render.is_subset(&plan.needed_data));
    }

    // Applying the plan yields exactly the needed set (modified chunks aside)
    #[test]
    fn applying_plan_reconstructs_needed(s in snapshot(), o in observer(), r in radius()) {
        let plan = plan_streaming(&s, o, DIMS, r);

        let mut data: HashSet<ChunkPosition> = s.data.keys().copied().collect();
        for p in &plan.data_to_remove { data.remove(p); }
        data.extend(plan.data_to_create.iter().copied());
        let kept_modified: HashSet<_> = s.data.iter()
            .filter(|(p, m)| **m && !plan.needed_data.contains(*p))
            .map(|(p, _)| *p)
            .collect();
        let expected: HashSet<_> = plan.needed_data.union(&kept_modified).copied().collect();
        prop_assert_eq!(data, expected);

        let mut render: HashSet<ChunkPosition> = s.render.clone();
        for p in &plan.render_to_remove { render.remove(p); }
        render.extend(plan.render_to_create.iter().copied());
        prop_assert_eq!(render, plan.needed_render.clone());
    }

    // Player-modified chunks are never scheduled for data removal
    #[test]
    fn modified_never_removed(s in snapshot(), o in observer(), r in radius()) {
        let plan = plan_streaming(&s, o, DIMS, r);
        for p in &plan.data_to_remove {
            prop_assert_eq!(s.data.get(p), Some(&false));
        }
    }

    // Create lists are sorted by distance to the observer
    #[test]
    fn create_lists_sorted(s in snapshot(), o in observer(), r in radius()) {
        let plan = plan_streaming(&s, o, DIMS, r);
        for w in plan.data_to_create.windows(2) {
            prop_assert!(w[0].distance_to(o) <= w[1].distance_to(o));
        }
        for w in plan.render_to_create.windows(2) {
            prop_assert!(w[0].distance_to(o) <= w[1].distance_to(o));
        }
    }

    // The terrain layer under the observer is rendered at any observer height
    #[test]
    fn terrain_layer_always_rendered(
        x in -500.0f32..500.0,
        y in -1_000.0f32..1_000.0,
        z in -500.0f32..500.0,
        r in radius(),
    ) {
        let o = Vec3::new(x, y, z);
        let plan = plan_streaming(&StoreSnapshot::default(), o, DIMS, r);
        let (ox, _, oz) = o.round_to_i32();
        let ground = ChunkPosition::containing(DIMS, ox, 0, oz);
        prop_assert!(plan.needed_render.contains(&ground));
        prop_assert_eq!(
            plan.needed_render.iter().filter(|p| p.y == 0).count(),
            ((2 * r.draw_radius + 1) * (2 * r.draw_radius + 1)) as usize
        );
        if plan.observer_chunk.y <= 0 {
            prop_assert!(plan.needed_render.contains(&plan.observer_chunk));
        }
    }

    // Every planned position is grid-aligned
    #[test]
    fn planned_positions_aligned(o in observer(), r in radius()) {
        let plan = plan_streaming(&StoreSnapshot::default(), o, DIMS, r);
        prop_assert!(plan.needed_data.iter().all(|p| p.is_aligned(DIMS)));
    }
}
