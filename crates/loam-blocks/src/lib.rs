//! Block types and their classification.
#![forbid(unsafe_code)]

pub mod types;

pub use types::{BlockType, UnknownBlock};
