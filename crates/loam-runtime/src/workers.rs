use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, bounded, unbounded};
use loam_geom::Vec3;
use loam_mesh_cpu::{ChunkMesh, build_chunk_mesh};
use loam_store::{Neighborhood, StoreSnapshot, StreamPlan, StreamRadius, plan_streaming};
use loam_world::{ChunkData, ChunkDims, ChunkPosition, TerrainGenerator};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cancel::CancelToken;
use crate::error::{PhaseError, RuntimeError};

/// Result of one worker phase, delivered as a single message.
pub type PhaseResult<T> = Result<Vec<(ChunkPosition, T)>, PhaseError>;

/// Worker pool running the off-thread phases of a streaming request.
pub struct Runtime {
    pool: Arc<ThreadPool>,
    workers: usize,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
}

impl Runtime {
    /// `workers == 0` picks the available parallelism.
    pub fn new(workers: usize) -> Result<Self, RuntimeError> {
        let workers = if workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            workers
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("loam-gen-{i}"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
            workers,
            queued: Arc::new(AtomicUsize::new(0)),
            inflight: Arc::new(AtomicUsize::new(0)),
        })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// `(queued, in flight)` chunk jobs across all running phases.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }

    pub fn plan(
        &self,
        snapshot: StoreSnapshot,
        observer: Vec3,
        dims: ChunkDims,
        radius: StreamRadius,
    ) -> Receiver<StreamPlan> {
        let (tx, rx) = bounded(1);
        self.pool.spawn(move || {
            let _ = tx.send(plan_streaming(&snapshot, observer, dims, radius));
        });
        rx
    }

    pub fn generate_data(
        &self,
        positions: Vec<ChunkPosition>,
        generator: Arc<TerrainGenerator>,
        token: CancelToken,
    ) -> Receiver<PhaseResult<Arc<ChunkData>>> {
        let jobs: Vec<_> = positions.into_iter().map(|p| (p, ())).collect();
        self.fan_out(jobs, token, move |pos, ()| {
            Arc::new(generator.generate_chunk(pos))
        })
    }

    pub fn build_meshes(
        &self,
        neighborhoods: Vec<Neighborhood>,
        token: CancelToken,
    ) -> Receiver<PhaseResult<ChunkMesh>> {
        let jobs: Vec<_> = neighborhoods
            .into_iter()
            .map(|n| (n.position(), n))
            .collect();
        self.fan_out(jobs, token, |_, n: Neighborhood| {
            build_chunk_mesh(&n.center, &n)
        })
    }

    /// Pushes `jobs` in order onto a FIFO consumed by every worker, then fans
    /// the results back in, preserving job order. Cancellation is checked
    /// before each job; a panicking job fails the whole phase.
    fn fan_out<T, R, F>(
        &self,
        jobs: Vec<(ChunkPosition, T)>,
        token: CancelToken,
        work: F,
    ) -> Receiver<PhaseResult<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(ChunkPosition, T) -> R + Send + Sync + 'static,
    {
        let (result_tx, result_rx) = bounded(1);
        let workers = self.workers;
        let queued = Arc::clone(&self.queued);
        let inflight = Arc::clone(&self.inflight);
        self.pool.spawn(move || {
            let total = jobs.len();
            let (job_tx, job_rx) = unbounded();
            queued.fetch_add(total, Ordering::Relaxed);
            for (i, (pos, job)) in jobs.into_iter().enumerate() {
                let _ = job_tx.send((i, pos, job));
            }
            drop(job_tx);

            let (out_tx, out_rx) = unbounded();
            let failed = AtomicBool::new(false);
            rayon::scope(|s| {
                for _ in 0..workers.min(total) {
                    let job_rx = job_rx.clone();
                    let out_tx = out_tx.clone();
                    let (work, token, failed) = (&work, &token, &failed);
                    let (queued, inflight) = (&queued, &inflight);
                    s.spawn(move |_| {
                        while let Ok((i, pos, job)) = job_rx.recv() {
                            queued.fetch_sub(1, Ordering::Relaxed);
                            if token.is_cancelled() || failed.load(Ordering::Relaxed) {
                                continue;
                            }
                            inflight.fetch_add(1, Ordering::Relaxed);
                            let res = catch_unwind(AssertUnwindSafe(|| work(pos, job)));
                            inflight.fetch_sub(1, Ordering::Relaxed);
                            let res = res.map_err(|payload| panic_reason(payload.as_ref()));
                            if res.is_err() {
                                failed.store(true, Ordering::Relaxed);
                            }
                            let _ = out_tx.send((i, pos, res));
                        }
                    });
                }
            });
            drop(out_tx);

            let mut done: Vec<(usize, ChunkPosition, R)> = Vec::with_capacity(total);
            let mut failure = None;
            for (i, pos, res) in out_rx.try_iter() {
                match res {
                    Ok(r) => done.push((i, pos, r)),
                    Err(reason) => {
                        failure.get_or_insert(PhaseError::GenerationFailure {
                            position: pos,
                            reason,
                        });
                    }
                }
            }
            let outcome = if let Some(err) = failure {
                Err(err)
            } else if token.is_cancelled() || done.len() != total {
                Err(PhaseError::Cancelled)
            } else {
                done.sort_unstable_by_key(|(i, _, _)| *i);
                Ok(done.into_iter().map(|(_, pos, r)| (pos, r)).collect())
            };
            let _ = result_tx.send(outcome);
        });
        result_rx
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
