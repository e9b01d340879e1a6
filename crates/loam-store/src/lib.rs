//! Loaded chunk bookkeeping and the streaming set-difference planner.
#![forbid(unsafe_code)]

mod error;
pub mod planner;
mod store;

pub use error::StoreError;
pub use planner::{StreamPlan, StreamRadius, needed_positions, plan_streaming};
pub use store::{FACE_NEIGHBORS, Neighborhood, StoreSnapshot, WorldDataStore};
