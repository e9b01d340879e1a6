use loam_world::ChunkPosition;

/// Violations of the store's key invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("chunk data already present at {0:?}")]
    DuplicateData(ChunkPosition),
    #[error("render handle already bound at {0:?}")]
    DuplicateRender(ChunkPosition),
    #[error("no chunk data at {0:?}")]
    MissingData(ChunkPosition),
    #[error("chunk at {0:?} was modified by the player")]
    ProtectedChunk(ChunkPosition),
    #[error("render handle still bound at {0:?}")]
    RenderStillBound(ChunkPosition),
}
