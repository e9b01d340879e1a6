//! Streaming pipeline: plans, generates, meshes and presents chunks around an
//! observer on a worker pool, merging results back on the owning thread.
#![forbid(unsafe_code)]

mod cancel;
mod error;
mod events;
mod pipeline;
mod presenter;
mod tracker;
mod workers;

pub use cancel::CancelToken;
pub use error::{EditError, PhaseError, RuntimeError};
pub use events::WorldEvent;
pub use loam_edit::RaycastHit;
pub use pipeline::{EditOutcome, StreamStats, StreamStatus, StreamingWorld};
pub use presenter::{HeadlessEntry, HeadlessPresenter, Presenter};
pub use tracker::ObserverTracker;
pub use workers::{PhaseResult, Runtime};
