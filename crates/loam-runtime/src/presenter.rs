use hashbrown::HashMap;
use loam_mesh_cpu::ChunkMesh;
use loam_world::ChunkPosition;

/// Presentation layer receiving finished chunk payloads. Called only from the
/// thread that owns the streaming world.
pub trait Presenter {
    type Handle;

    fn create_renderable(&mut self, position: ChunkPosition, mesh: &ChunkMesh) -> Self::Handle;
    fn update_renderable(&mut self, handle: &Self::Handle, mesh: &ChunkMesh);
    fn set_active(&mut self, handle: &Self::Handle, active: bool);

    /// Final disposal of an evicted renderable.
    fn release(&mut self, handle: Self::Handle) {
        self.set_active(&handle, false);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessEntry {
    pub position: ChunkPosition,
    pub quads: usize,
    pub active: bool,
    pub updates: u32,
}

/// Presenter without a renderer: keeps per-handle bookkeeping only.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    next_id: u64,
    entries: HashMap<u64, HeadlessEntry>,
    total_quads: usize,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, handle: u64) -> Option<&HeadlessEntry> {
        self.entries.get(&handle)
    }

    pub fn live(&self) -> usize {
        self.entries.len()
    }

    pub fn active(&self) -> usize {
        self.entries.values().filter(|e| e.active).count()
    }

    /// Quads currently held by live renderables.
    pub fn total_quads(&self) -> usize {
        self.total_quads
    }
}

impl Presenter for HeadlessPresenter {
    type Handle = u64;

    fn create_renderable(&mut self, position: ChunkPosition, mesh: &ChunkMesh) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.total_quads += mesh.quad_count();
        self.entries.insert(
            id,
            HeadlessEntry {
                position,
                quads: mesh.quad_count(),
                active: true,
                updates: 0,
            },
        );
        id
    }

    fn update_renderable(&mut self, handle: &u64, mesh: &ChunkMesh) {
        if let Some(e) = self.entries.get_mut(handle) {
            self.total_quads = self.total_quads - e.quads + mesh.quad_count();
            e.quads = mesh.quad_count();
            e.updates += 1;
        }
    }

    fn set_active(&mut self, handle: &u64, active: bool) {
        if let Some(e) = self.entries.get_mut(handle) {
            e.active = active;
        }
    }

    fn release(&mut self, handle: u64) {
        if let Some(e) = self.entries.remove(&handle) {
            self.total_quads -= e.quads;
        }
    }
}
