//! World coordinates, chunk voxel data, noise sampling and terrain generation.
#![forbid(unsafe_code)]

mod chunk;
mod chunk_position;
pub mod generation;
pub mod noise;
pub mod worldgen;

pub use chunk::{BlockLookup, ChunkData};
pub use chunk_position::{ChunkDims, ChunkPosition, SeedOffset};
pub use generation::{BiomeGenerator, BlockLayer, ColumnContext, TerrainGenerator};
pub use noise::{DomainWarping, NoiseBasis, NoiseField, NoiseSettings};
pub use worldgen::{ConfigError, WorldGenConfig};
