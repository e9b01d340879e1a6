use std::time::{Duration, Instant};

use loam_geom::Vec3;
use loam_runtime::ObserverTracker;
use loam_world::ChunkDims;
use proptest::prelude::*;

const DIMS: ChunkDims = ChunkDims::new(16, 100);
const INTERVAL: Duration = Duration::from_millis(1000);

proptest! {
    #[test]
    fn never_requests_inside_the_interval(
        x in -500.0f32..500.0,
        z in -500.0f32..500.0,
        dx in -200.0f32..200.0,
        dz in -200.0f32..200.0,
        wait_ms in 0u64..1000,
    ) {
        let mut t = ObserverTracker::new(DIMS, INTERVAL);
        let start = Instant::now();
        let first = Vec3::new(x, 10.0, z);
        prop_assert_eq!(t.poll(start, first), Some(first));
        let later = start + Duration::from_millis(wait_ms);
        prop_assert_eq!(t.poll(later, Vec3::new(x + dx, 10.0, z + dz)), None);
    }

    #[test]
    fn small_moves_never_request(
        x in -500.0f32..500.0,
        z in -500.0f32..500.0,
        dx in -7.0f32..7.0,
        dz in -7.0f32..7.0,
    ) {
        let mut t = ObserverTracker::new(DIMS, INTERVAL);
        let start = Instant::now();
        t.poll(start, Vec3::new(x, 10.0, z));
        // The anchor is the center of the observer's chunk, so a move of less
        // than half a chunk stays within one chunk size of it.
        let later = start + INTERVAL * 2;
        prop_assert_eq!(t.poll(later, Vec3::new(x + dx, 10.0, z + dz)), None);
    }

    #[test]
    fn far_moves_request_after_the_interval(
        x in -500.0f32..500.0,
        z in -500.0f32..500.0,
        dx in 40.0f32..200.0,
    ) {
        let mut t = ObserverTracker::new(DIMS, INTERVAL);
        let start = Instant::now();
        t.poll(start, Vec3::new(x, 10.0, z));
        let moved = Vec3::new(x + dx, 10.0, z);
        prop_assert_eq!(t.poll(start + INTERVAL, moved), Some(moved));
    }
}
