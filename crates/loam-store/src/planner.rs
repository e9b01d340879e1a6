//! Set difference between the chunks an observer needs and the chunks loaded.

use hashbrown::HashSet;
use loam_geom::Vec3;
use loam_world::{ChunkDims, ChunkPosition};

use crate::store::StoreSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamRadius {
    /// Horizontal render radius in chunks. Data uses one more.
    pub draw_radius: i32,
    /// Chunk layers kept below the terrain layer around the observer.
    pub vertical_band: i32,
}

impl Default for StreamRadius {
    fn default() -> Self {
        Self {
            draw_radius: 8,
            vertical_band: 2,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamPlan {
    /// Point the plan was computed for.
    pub observer: Vec3,
    pub observer_chunk: ChunkPosition,
    pub needed_render: HashSet<ChunkPosition>,
    pub needed_data: HashSet<ChunkPosition>,
    /// Nearest first.
    pub render_to_create: Vec<ChunkPosition>,
    /// Nearest first.
    pub data_to_create: Vec<ChunkPosition>,
    pub render_to_remove: Vec<ChunkPosition>,
    pub data_to_remove: Vec<ChunkPosition>,
}

impl StreamPlan {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.render_to_create.is_empty()
            && self.data_to_create.is_empty()
            && self.render_to_remove.is_empty()
            && self.data_to_remove.is_empty()
    }
}

/// Square of `radius` around `center` on the terrain layer (`y = 0`), plus a
/// band of layers hanging below the 3x3 ring directly around `center`.
///
/// The band is `vertical_band` layers deep. While `center` lies below the
/// terrain layer the band reaches that much further down, so the observer's
/// own layer is always included.
pub fn needed_positions(
    center: ChunkPosition,
    dims: ChunkDims,
    radius: i32,
    vertical_band: i32,
) -> HashSet<ChunkPosition> {
    let ground = ChunkPosition::new(center.x, 0, center.z);
    let depth = vertical_band - (center.y / dims.height).min(0);
    let mut out = HashSet::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            out.insert(ground.offset_chunks(dims, dx, 0, dz));
            if dx.abs() <= 1 && dz.abs() <= 1 {
                for dy in 1..=depth {
                    out.insert(ground.offset_chunks(dims, dx, -dy, dz));
                }
            }
        }
    }
    out
}

pub fn plan_streaming(
    snapshot: &StoreSnapshot,
    observer: Vec3,
    dims: ChunkDims,
    radius: StreamRadius,
) -> StreamPlan {
    let (ox, oy, oz) = observer.round_to_i32();
    let observer_chunk = ChunkPosition::containing(dims, ox, oy, oz);

    let needed_render = needed_positions(
        observer_chunk,
        dims,
        radius.draw_radius,
        radius.vertical_band,
    );
    let needed_data = needed_positions(
        observer_chunk,
        dims,
        radius.draw_radius + 1,
        radius.vertical_band,
    );

    let mut data_to_create: Vec<_> = needed_data
        .iter()
        .filter(|p| !snapshot.data.contains_key(*p))
        .copied()
        .collect();
    let mut render_to_create: Vec<_> = needed_render
        .iter()
        .filter(|p| !snapshot.render.contains(*p))
        .copied()
        .collect();
    sort_nearest_first(&mut data_to_create, observer);
    sort_nearest_first(&mut render_to_create, observer);

    let mut data_to_remove: Vec<_> = snapshot
        .data
        .iter()
        .filter(|(p, modified)| !**modified && !needed_data.contains(*p))
        .map(|(p, _)| *p)
        .collect();
    let mut render_to_remove: Vec<_> = snapshot
        .render
        .iter()
        .filter(|p| !needed_render.contains(*p))
        .copied()
        .collect();
    data_to_remove.sort_unstable();
    render_to_remove.sort_unstable();

    StreamPlan {
        observer,
        observer_chunk,
        needed_render,
        needed_data,
        render_to_create,
        data_to_create,
        render_to_remove,
        data_to_remove,
    }
}

fn sort_nearest_first(positions: &mut [ChunkPosition], observer: Vec3) {
    positions.sort_by(|a, b| {
        a.distance_to(observer)
            .total_cmp(&b.distance_to(observer))
            .then_with(|| a.cmp(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDims = ChunkDims::new(16, 100);

    fn radius(r: i32) -> StreamRadius {
        StreamRadius {
            draw_radius: r,
            vertical_band: 2,
        }
    }

    #[test]
    fn radius_one_at_origin_on_empty_store() {
        let plan = plan_streaming(&StoreSnapshot::default(), Vec3::ZERO, DIMS, radius(1));
        assert_eq!(plan.observer_chunk, ChunkPosition::new(0, 0, 0));
        assert_eq!(plan.needed_render.len(), 27);
        assert_eq!(plan.render_to_create.len(), 27);
        // 5x5 at the observer layer plus the 3x3 ring on two lower layers.
        assert_eq!(plan.needed_data.len(), 25 + 18);
        assert_eq!(plan.data_to_create.len(), 43);
        assert!(plan.render_to_remove.is_empty());
        assert!(plan.data_to_remove.is_empty());
        assert!(plan.needed_render.contains(&ChunkPosition::new(-16, -200, 16)));
        assert!(!plan.needed_render.contains(&ChunkPosition::new(0, 100, 0)));
    }

    #[test]
    fn create_lists_are_nearest_first() {
        let observer = Vec3::new(3.0, 10.0, -5.0);
        let plan = plan_streaming(&StoreSnapshot::default(), observer, DIMS, radius(2));
        assert_eq!(plan.render_to_create[0], ChunkPosition::new(0, 0, 0));
        for w in plan.data_to_create.windows(2) {
            assert!(w[0].distance_to(observer) <= w[1].distance_to(observer));
        }
    }

    #[test]
    fn observer_rounds_before_quantizing() {
        let plan = plan_streaming(
            &StoreSnapshot::default(),
            Vec3::new(-0.4, 0.0, 15.6),
            DIMS,
            radius(0),
        );
        assert_eq!(plan.observer_chunk, ChunkPosition::new(0, 0, 16));
    }

    #[test]
    fn modified_chunks_never_removed() {
        let mut snapshot = StoreSnapshot::default();
        let far = ChunkPosition::new(160, 0, 0);
        let far_modified = ChunkPosition::new(-160, 0, 0);
        snapshot.data.insert(far, false);
        snapshot.data.insert(far_modified, true);
        snapshot.render.insert(far);
        let plan = plan_streaming(&snapshot, Vec3::ZERO, DIMS, radius(1));
        assert_eq!(plan.data_to_remove, vec![far]);
        assert_eq!(plan.render_to_remove, vec![far]);
    }

    #[test]
    fn high_observer_keeps_the_terrain_layer() {
        let plan = plan_streaming(
            &StoreSnapshot::default(),
            Vec3::new(0.0, 100.0, 0.0),
            DIMS,
            radius(8),
        );
        assert_eq!(plan.observer_chunk, ChunkPosition::new(0, 100, 0));
        assert_eq!(plan.needed_render.len(), 17 * 17 + 9 * 2);
        assert!(plan.needed_render.contains(&ChunkPosition::new(128, 0, 128)));
        assert!(plan.needed_render.contains(&ChunkPosition::new(-16, -200, -16)));
        assert!(plan.needed_render.iter().all(|p| p.y <= 0));
        assert!(plan.needed_data.contains(&ChunkPosition::new(144, 0, -144)));
    }

    #[test]
    fn underground_observer_extends_the_band() {
        let plan = plan_streaming(
            &StoreSnapshot::default(),
            Vec3::new(5.0, -250.0, 5.0),
            DIMS,
            radius(1),
        );
        assert_eq!(plan.observer_chunk, ChunkPosition::new(0, -300, 0));
        // Layers -100 down to -500: two band layers below the observer's.
        assert_eq!(plan.needed_render.len(), 9 * 6);
        assert!(plan.needed_render.contains(&ChunkPosition::new(0, -300, 0)));
        assert!(plan.needed_render.contains(&ChunkPosition::new(16, -500, -16)));
        assert!(!plan.needed_render.contains(&ChunkPosition::new(0, -600, 0)));
    }

    #[test]
    fn zero_radius_keeps_single_column_band() {
        let plan = plan_streaming(&StoreSnapshot::default(), Vec3::ZERO, DIMS, radius(0));
        assert_eq!(plan.needed_render.len(), 3);
        assert_eq!(plan.needed_data.len(), 9 + 18);
    }
}
