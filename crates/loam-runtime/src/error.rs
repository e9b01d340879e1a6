use loam_world::ChunkPosition;

/// Why a worker phase produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("phase cancelled")]
    Cancelled,
    #[error("generation failed at {position:?}: {reason}")]
    GenerationFailure {
        position: ChunkPosition,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no chunk data loaded for voxel ({x}, {y}, {z})")]
    UnresolvedPosition { x: i32, y: i32, z: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}
