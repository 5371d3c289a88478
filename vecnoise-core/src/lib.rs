//! Runtime side of vecnoise.
//!
//! Detects what the CPU can run, keeps a registry of the compiled kernels,
//! binds a [`NoiseConfig`] to the widest one available and fills grids or point
//! sets with it, optionally across a rayon pool. [`Noise`] wraps the whole flow.

pub mod buffer;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fill;
pub mod grid;
pub mod registry;

pub use buffer::{AlignedBuffer, NoiseGrid};
pub use config::{CellularConfig, NoiseConfig, PerturbConfig};
pub use detect::{CapabilityDescriptor, CpuFeatures, MAX_TIER_ENV, detect, detect_hardware};
pub use dispatch::{KernelBinding, bind, bind_with};
pub use engine::{Noise, NoiseBuilder};
pub use error::{NoiseError, Result};
pub use fill::{CancelToken, FillOptions, Workers, fill, fill_points, fill_points_with, fill_with};
pub use grid::{GridCursor, GridRegion, PointSet};
pub use registry::{Kernel, KernelRegistry, KernelRegistryBuilder};
pub use vecnoise_utils::{
    BATCH_LANES, CellularDistance, CellularReturnType, CoordBatch, Dims, FractalType, Lanes,
    NoiseType, PerturbType, SimdTier,
};
