//! Vectorized noise math for vecnoise.
//!
//! This crate holds everything that runs inside a kernel: the per-tier SIMD
//! backends, the noise algorithms written once against them, and the
//! `#[target_feature]` entry points in [`kernels`] that instantiate the
//! algorithms for each tier. Picking a tier and driving whole grids lives in
//! `vecnoise-core`.

pub mod batch;
pub mod kernels;
pub mod noise;
pub mod simd;

pub use batch::{BATCH_LANES, CoordBatch, Dims, Lanes};
pub use noise::{
    CellularDistance, CellularParams, CellularReturnType, FractalType, NoiseParams, NoiseType,
    PerturbParams, PerturbType, UnknownVariant,
};
pub use simd::{MAX_LANES, SimdTier, UnknownTier};
