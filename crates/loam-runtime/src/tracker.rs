use std::time::{Duration, Instant};

use loam_geom::Vec3;
use loam_world::{ChunkDims, ChunkPosition};

/// Decides, at a fixed polling interval, when the observer has strayed far
/// enough from the last streaming center to warrant a new request.
#[derive(Clone, Debug)]
pub struct ObserverTracker {
    dims: ChunkDims,
    interval: Duration,
    last_poll: Option<Instant>,
    anchor: Option<Anchor>,
}

#[derive(Clone, Copy, Debug)]
struct Anchor {
    chunk: ChunkPosition,
    center_x: f32,
    center_z: f32,
}

impl ObserverTracker {
    pub fn new(dims: ChunkDims, interval: Duration) -> Self {
        Self {
            dims,
            interval,
            last_poll: None,
            anchor: None,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the position to stream at, or `None` when no request is due.
    /// The first poll always requests.
    pub fn poll(&mut self, now: Instant, observer: Vec3) -> Option<Vec3> {
        let Some(anchor) = self.anchor else {
            self.rebase(now, observer);
            return Some(observer);
        };
        if let Some(last) = self.last_poll {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_poll = Some(now);
        let moved = (anchor.center_x - observer.x).abs() > self.dims.size as f32
            || (anchor.center_z - observer.z).abs() > self.dims.size as f32
            || (anchor.chunk.y as f32 - observer.y).abs() > self.dims.height as f32;
        if !moved {
            return None;
        }
        self.rebase(now, observer);
        Some(observer)
    }

    /// Forgets the anchor; the next poll requests immediately.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.last_poll = None;
    }

    fn rebase(&mut self, now: Instant, observer: Vec3) {
        let (x, y, z) = observer.round_to_i32();
        let chunk = ChunkPosition::containing(self.dims, x, y, z);
        let half = (self.dims.size / 2) as f32;
        self.anchor = Some(Anchor {
            chunk,
            center_x: chunk.x as f32 + half,
            center_z: chunk.z as f32 + half,
        });
        self.last_poll = Some(now);
    }
}
