use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use hashbrown::HashSet;
use loam_blocks::BlockType;
use loam_edit::{EditTarget, RaycastHit, boundary_neighbors};
use loam_geom::Vec3;
use loam_mesh_cpu::{ChunkMesh, build_chunk_mesh};
use loam_store::{StoreError, StreamPlan, StreamRadius, WorldDataStore};
use loam_world::{ChunkData, ChunkDims, ChunkPosition, TerrainGenerator, WorldGenConfig};

use crate::cancel::CancelToken;
use crate::error::{EditError, PhaseError, RuntimeError};
use crate::events::{EventBus, WorldEvent};
use crate::presenter::Presenter;
use crate::workers::{PhaseResult, Runtime};

/// Whether the pipeline still has work for later ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamStatus {
    Idle,
    Busy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_cancelled: u64,
    pub runs_failed: u64,
    pub chunks_generated: u64,
    pub meshes_built: u64,
    pub presented: u64,
    pub render_evicted: u64,
    pub data_evicted: u64,
    pub edits: u64,
}

/// Result of a successful voxel edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub world: (i32, i32, i32),
    pub block: BlockType,
    pub chunk: ChunkPosition,
    /// Rendered chunks whose payload was rebuilt, edited chunk first.
    pub refreshed: Vec<ChunkPosition>,
}

struct PendingMesh {
    position: ChunkPosition,
    mesh: ChunkMesh,
    stale: bool,
}

enum Phase {
    Idle,
    Planning {
        token: CancelToken,
        rx: Receiver<StreamPlan>,
    },
    GeneratingData {
        token: CancelToken,
        plan: StreamPlan,
        rx: Receiver<PhaseResult<Arc<ChunkData>>>,
    },
    Meshing {
        token: CancelToken,
        rx: Receiver<PhaseResult<ChunkMesh>>,
        /// Chunks touched by edits while the workers were meshing.
        edited: HashSet<ChunkPosition>,
    },
    Presenting {
        token: CancelToken,
        pending: VecDeque<PendingMesh>,
        created: Vec<ChunkPosition>,
    },
}

impl Phase {
    fn token(&self) -> Option<&CancelToken> {
        match self {
            Phase::Idle => None,
            Phase::Planning { token, .. }
            | Phase::GeneratingData { token, .. }
            | Phase::Meshing { token, .. }
            | Phase::Presenting { token, .. } => Some(token),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Planning { .. } => "planning",
            Phase::GeneratingData { .. } => "generating",
            Phase::Meshing { .. } => "meshing",
            Phase::Presenting { .. } => "presenting",
        }
    }
}

enum Poll<T> {
    Ready(T),
    Pending,
    Lost,
}

fn poll<T>(rx: &Receiver<T>, block: bool) -> Poll<T> {
    if block {
        return match rx.recv() {
            Ok(v) => Poll::Ready(v),
            Err(_) => Poll::Lost,
        };
    }
    match rx.try_recv() {
        Ok(v) => Poll::Ready(v),
        Err(TryRecvError::Empty) => Poll::Pending,
        Err(TryRecvError::Disconnected) => Poll::Lost,
    }
}

/// Owns the loaded world around an observer and streams chunks in and out of
/// it. Every method runs on the owning thread; heavy work happens on the
/// worker pool and is merged back by [`StreamingWorld::tick`].
pub struct StreamingWorld<P: Presenter> {
    dims: ChunkDims,
    radius: StreamRadius,
    generator: Arc<TerrainGenerator>,
    runtime: Runtime,
    store: WorldDataStore<P::Handle>,
    presenter: P,
    root: CancelToken,
    phase: Phase,
    events: EventBus,
    world_ready: bool,
    stats: StreamStats,
}

impl<P: Presenter> StreamingWorld<P> {
    pub fn new(cfg: &WorldGenConfig, presenter: P) -> Result<Self, RuntimeError> {
        let radius = StreamRadius {
            draw_radius: cfg.world.draw_radius,
            vertical_band: cfg.world.vertical_band,
        };
        Self::with_generator(
            TerrainGenerator::from_config(cfg),
            radius,
            cfg.world.workers,
            presenter,
        )
    }

    pub fn with_generator(
        generator: TerrainGenerator,
        radius: StreamRadius,
        workers: usize,
        presenter: P,
    ) -> Result<Self, RuntimeError> {
        let runtime = Runtime::new(workers)?;
        let dims = generator.dims();
        log::info!(
            target: "stream",
            "[stream] world {}x{} radius={} band={} workers={}",
            dims.size,
            dims.height,
            radius.draw_radius,
            radius.vertical_band,
            runtime.workers()
        );
        Ok(Self {
            dims,
            radius,
            generator: Arc::new(generator),
            runtime,
            store: WorldDataStore::new(dims),
            presenter,
            root: CancelToken::root(),
            phase: Phase::Idle,
            events: EventBus::default(),
            world_ready: false,
            stats: StreamStats::default(),
        })
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn radius(&self) -> StreamRadius {
        self.radius
    }

    #[inline]
    pub fn store(&self) -> &WorldDataStore<P::Handle> {
        &self.store
    }

    #[inline]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    #[inline]
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    #[inline]
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[inline]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn subscribe(&mut self) -> Receiver<WorldEvent> {
        self.events.subscribe()
    }

    /// Starts a streaming run around `observer`, superseding any run in
    /// flight. The superseded run is cancelled and its outstanding worker
    /// phase is awaited so it cannot merge anything afterwards.
    /// Non-finite positions are ignored and leave the current run alone.
    pub fn request_streaming_at(&mut self, observer: Vec3) {
        if !observer.is_finite() {
            log::warn!(target: "stream", "[stream] ignoring request at non-finite {observer:?}");
            return;
        }
        self.abort_in_flight();
        if self.root.is_cancelled() {
            log::debug!(target: "stream", "[stream] request ignored after shutdown");
            return;
        }
        let token = self.root.child();
        let rx = self
            .runtime
            .plan(self.store.snapshot(), observer, self.dims, self.radius);
        self.stats.runs_started += 1;
        log::debug!(
            target: "stream",
            "[stream] request at ({:.1},{:.1},{:.1})",
            observer.x,
            observer.y,
            observer.z
        );
        self.phase = Phase::Planning { token, rx };
    }

    /// Advances the run by at most one step without blocking. At most one
    /// chunk is presented per call.
    pub fn tick(&mut self) -> StreamStatus {
        self.step(false)
    }

    /// Ticks until the run finishes or `max_ticks` is reached, blocking on
    /// worker phases instead of spinning. Returns whether the world is idle.
    pub fn pump_until_idle(&mut self, max_ticks: usize) -> bool {
        for _ in 0..max_ticks {
            if self.step(true) == StreamStatus::Idle {
                return true;
            }
        }
        self.is_idle()
    }

    /// Cancels everything derived from the root token and waits for the
    /// worker phase in flight. Later requests are ignored.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.abort_in_flight();
        log::info!(
            target: "stream",
            "[stream] shutdown data={} render={}",
            self.store.data_len(),
            self.store.render_len()
        );
    }

    /// Drops every chunk, player edits included, and releases all
    /// renderables.
    pub fn teardown(&mut self) {
        self.abort_in_flight();
        for (_, handle) in self.store.teardown() {
            self.presenter.set_active(&handle, false);
            self.presenter.release(handle);
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(token) = self.phase.token() {
            token.cancel();
        }
        let superseded = !matches!(self.phase, Phase::Idle);
        // Blocks until the outstanding worker phase reports back; workers
        // observe the cancelled token between chunks.
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Planning { rx, .. } => {
                let _ = rx.recv();
            }
            Phase::GeneratingData { rx, .. } => {
                let _ = rx.recv();
            }
            Phase::Meshing { rx, .. } => {
                let _ = rx.recv();
            }
            Phase::Presenting { .. } | Phase::Idle => {}
        }
        if superseded {
            self.stats.runs_cancelled += 1;
            log::debug!(target: "stream", "[stream] run superseded");
        }
    }

    fn step(&mut self, block: bool) -> StreamStatus {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.phase = match phase {
            Phase::Idle => Phase::Idle,
            Phase::Planning { token, rx } => match poll(&rx, block) {
                Poll::Pending => Phase::Planning { token, rx },
                Poll::Lost => self.fail_run("planner vanished"),
                Poll::Ready(_) if token.is_cancelled() => self.cancel_run(),
                Poll::Ready(plan) => self.after_plan(token, plan),
            },
            Phase::GeneratingData { token, plan, rx } => match poll(&rx, block) {
                Poll::Pending => Phase::GeneratingData { token, plan, rx },
                Poll::Lost => self.fail_run("data phase vanished"),
                Poll::Ready(result) => match self.settle(&token, result) {
                    Some(chunks) => self.after_data(token, plan, chunks),
                    None => Phase::Idle,
                },
            },
            Phase::Meshing { token, rx, edited } => match poll(&rx, block) {
                Poll::Pending => Phase::Meshing { token, rx, edited },
                Poll::Lost => self.fail_run("mesh phase vanished"),
                Poll::Ready(result) => match self.settle(&token, result) {
                    Some(meshes) => {
                        self.stats.meshes_built += meshes.len() as u64;
                        let pending = meshes
                            .into_iter()
                            .map(|(position, mesh)| PendingMesh {
                                position,
                                mesh,
                                stale: edited.contains(&position),
                            })
                            .collect();
                        Phase::Presenting {
                            token,
                            pending,
                            created: Vec::new(),
                        }
                    }
                    None => Phase::Idle,
                },
            },
            Phase::Presenting {
                token,
                mut pending,
                mut created,
            } => {
                if token.is_cancelled() {
                    self.cancel_run()
                } else if let Some(next) = pending.pop_front() {
                    if let Some(pos) = self.present(next) {
                        created.push(pos);
                    }
                    if pending.is_empty() {
                        self.complete_run(created)
                    } else {
                        Phase::Presenting {
                            token,
                            pending,
                            created,
                        }
                    }
                } else {
                    self.complete_run(created)
                }
            }
        };
        if self.is_idle() {
            StreamStatus::Idle
        } else {
            StreamStatus::Busy
        }
    }

    /// Unpacks a phase result, ending the run quietly on cancel or failure.
    fn settle<T>(&mut self, token: &CancelToken, result: PhaseResult<T>) -> Option<Vec<(ChunkPosition, T)>> {
        match result {
            Ok(_) if token.is_cancelled() => {
                self.cancel_run();
                None
            }
            Ok(v) => Some(v),
            Err(PhaseError::Cancelled) => {
                self.cancel_run();
                None
            }
            Err(err @ PhaseError::GenerationFailure { .. }) => {
                self.stats.runs_failed += 1;
                log::warn!(target: "stream", "[stream] run dropped: {err}");
                None
            }
        }
    }

    fn cancel_run(&mut self) -> Phase {
        self.stats.runs_cancelled += 1;
        log::debug!(target: "stream", "[stream] run cancelled");
        Phase::Idle
    }

    fn fail_run(&mut self, reason: &str) -> Phase {
        self.stats.runs_failed += 1;
        log::warn!(target: "stream", "[stream] run dropped: {reason}");
        Phase::Idle
    }

    fn after_plan(&mut self, token: CancelToken, plan: StreamPlan) -> Phase {
        log::debug!(
            target: "stream",
            "[plan] chunk=({},{},{}) data +{} -{} render +{} -{}",
            plan.observer_chunk.x,
            plan.observer_chunk.y,
            plan.observer_chunk.z,
            plan.data_to_create.len(),
            plan.data_to_remove.len(),
            plan.render_to_create.len(),
            plan.render_to_remove.len()
        );
        self.evict(&plan);
        if plan.data_to_create.is_empty() {
            return self.start_meshing(token, &plan);
        }
        let rx = self.runtime.generate_data(
            plan.data_to_create.clone(),
            Arc::clone(&self.generator),
            token.clone(),
        );
        Phase::GeneratingData { token, plan, rx }
    }

    /// Render entries first, then data. Data eviction drops a still-bound
    /// renderable itself and never touches player-modified chunks.
    fn evict(&mut self, plan: &StreamPlan) {
        for &pos in &plan.render_to_remove {
            if let Some(handle) = self.store.remove_render(pos) {
                self.presenter.set_active(&handle, false);
                self.presenter.release(handle);
                self.stats.render_evicted += 1;
            }
        }
        for &pos in &plan.data_to_remove {
            if let Some(handle) = self.store.remove_render(pos) {
                self.presenter.set_active(&handle, false);
                self.presenter.release(handle);
                self.stats.render_evicted += 1;
            }
            match self.store.remove_data(pos) {
                Ok(Some(_)) => self.stats.data_evicted += 1,
                Ok(None) => {}
                Err(StoreError::ProtectedChunk(_)) => {
                    log::debug!(target: "stream", "[evict] keeping edited chunk {pos:?}");
                }
                Err(err) => log::error!(target: "stream", "[evict] {err}"),
            }
        }
    }

    fn after_data(
        &mut self,
        token: CancelToken,
        plan: StreamPlan,
        chunks: Vec<(ChunkPosition, Arc<ChunkData>)>,
    ) -> Phase {
        self.stats.chunks_generated += chunks.len() as u64;
        for (pos, chunk) in chunks {
            let duplicate = self.store.contains_data(pos);
            debug_assert!(!duplicate, "generated chunk {pos:?} already loaded");
            if duplicate {
                log::error!(target: "stream", "[publish] skipping duplicate chunk {pos:?}");
                continue;
            }
            if let Err(err) = self.store.insert(pos, chunk) {
                log::error!(target: "stream", "[publish] {err}");
            }
        }
        self.start_meshing(token, &plan)
    }

    fn start_meshing(&mut self, token: CancelToken, plan: &StreamPlan) -> Phase {
        let jobs: Vec<_> = plan
            .render_to_create
            .iter()
            .filter(|p| !self.store.contains_render(**p))
            .filter_map(|p| self.store.neighborhood(*p))
            .collect();
        let rx = self.runtime.build_meshes(jobs, token.clone());
        Phase::Meshing {
            token,
            rx,
            edited: HashSet::new(),
        }
    }

    fn present(&mut self, next: PendingMesh) -> Option<ChunkPosition> {
        let PendingMesh {
            position,
            mut mesh,
            stale,
        } = next;
        if self.store.contains_render(position) {
            return None;
        }
        let chunk = self.store.get(position)?;
        if stale || chunk.revision() != mesh.revision {
            log::debug!(target: "stream", "[present] rebuilding stale payload {position:?}");
            mesh = self.rebuild_mesh(position)?;
        }
        let handle = self.presenter.create_renderable(position, &mesh);
        if let Err(err) = self.store.bind(position, handle) {
            log::error!(target: "stream", "[present] {err}");
            return None;
        }
        self.stats.presented += 1;
        Some(position)
    }

    fn complete_run(&mut self, created: Vec<ChunkPosition>) -> Phase {
        self.stats.runs_completed += 1;
        log::info!(
            target: "stream",
            "[stream] run complete: +{} render={} data={}",
            created.len(),
            self.store.render_len(),
            self.store.data_len()
        );
        let event = if self.world_ready {
            WorldEvent::ChunksAppended { created }
        } else {
            self.world_ready = true;
            WorldEvent::WorldReady
        };
        self.events.publish(event);
        Phase::Idle
    }

    fn rebuild_mesh(&self, position: ChunkPosition) -> Option<ChunkMesh> {
        let n = self.store.neighborhood(position)?;
        Some(build_chunk_mesh(&n.center, &n))
    }

    /// Rebuilds and pushes the payload of a rendered chunk. Returns whether
    /// a renderable was updated.
    fn refresh_render(&mut self, position: ChunkPosition) -> bool {
        if !self.store.contains_render(position) {
            return false;
        }
        let Some(mesh) = self.rebuild_mesh(position) else {
            return false;
        };
        match self.store.render_handle(position) {
            Some(handle) => {
                self.presenter.update_renderable(handle, &mesh);
                true
            }
            None => false,
        }
    }

    /// Writes `block` into the voxel behind `hit`. Returns `false` when no
    /// chunk data is loaded there.
    pub fn set_block(&mut self, hit: RaycastHit, block: BlockType) -> bool {
        match self.apply_edit(hit, block) {
            Ok(_) => true,
            Err(err) => {
                log::debug!(target: "edit", "[edit] {err}");
                false
            }
        }
    }

    pub fn apply_edit(&mut self, hit: RaycastHit, block: BlockType) -> Result<EditOutcome, EditError> {
        let (wx, wy, wz) = hit.block_position();
        let target = EditTarget::resolve(self.dims, wx, wy, wz);
        let Some(chunk) = self.store.get_mut(target.chunk) else {
            return Err(EditError::UnresolvedPosition {
                x: wx,
                y: wy,
                z: wz,
            });
        };
        let (lx, ly, lz) = target.local;
        chunk.apply_edit(lx, ly, lz, block);
        self.stats.edits += 1;

        let neighbors = boundary_neighbors(self.dims, target.chunk, target.local);
        let mut refreshed = Vec::new();
        for pos in std::iter::once(target.chunk).chain(neighbors.iter().copied()) {
            if self.refresh_render(pos) {
                refreshed.push(pos);
            }
        }

        // Payloads built or being built from the pre-edit voxels. A mesh
        // reads its face neighbors, so a matching center revision is not
        // enough to trust it.
        let touched = std::iter::once(target.chunk).chain(neighbors.iter().copied());
        match &mut self.phase {
            Phase::Meshing { edited, .. } => edited.extend(touched),
            Phase::Presenting { pending, .. } => {
                let touched: HashSet<ChunkPosition> = touched.collect();
                for p in pending.iter_mut().filter(|p| touched.contains(&p.position)) {
                    p.stale = true;
                }
            }
            _ => {}
        }

        log::info!(
            target: "edit",
            "[edit] ({},{},{}) <- {} chunk=({},{},{}) refreshed={}",
            wx,
            wy,
            wz,
            block,
            target.chunk.x,
            target.chunk.y,
            target.chunk.z,
            refreshed.len()
        );
        Ok(EditOutcome {
            world: (wx, wy, wz),
            block,
            chunk: target.chunk,
            refreshed,
        })
    }

    /// World y of the topmost solid voxel in column `(wx, wz)` among loaded
    /// chunks. Used to place an observer on the ground.
    pub fn surface_height_at(&self, wx: i32, wz: i32) -> Option<i32> {
        let column = ChunkPosition::containing(self.dims, wx, 0, wz);
        let mut chunks: Vec<_> = self
            .store
            .data_positions()
            .filter(|p| p.x == column.x && p.z == column.z)
            .collect();
        chunks.sort_unstable_by(|a, b| b.y.cmp(&a.y));
        let (lx, lz) = ((wx - column.x) as usize, (wz - column.z) as usize);
        chunks
            .into_iter()
            .filter_map(|p| self.store.get(p))
            .find_map(|c| c.top_solid_in_column(lx, lz))
    }
}

impl<P: Presenter> Drop for StreamingWorld<P> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
