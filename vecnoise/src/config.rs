//! Job files.
//!
//! A job is a JSON5 document:
//!
//! ```json5
//! {
//!   noise: { type: "perlin", seed: 42, frequency: 0.02 },
//!   region: { origin: [0, 0, 0], counts: [128, 128, 64] },
//!   workers: 4,          // optional, rayon's global pool otherwise
//!   max_tier: "avx2",    // optional
//!   output: "out.f32",   // optional, raw little-endian f32
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use vecnoise_core::{GridRegion, NoiseConfig, SimdTier};

/// Sample lattice as written in a job file. `step` defaults to 1 on every axis.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRegion {
    pub origin: Vec<f32>,
    pub counts: Vec<usize>,
    #[serde(default)]
    pub step: Option<Vec<f32>>,
}

impl JobRegion {
    pub fn to_region(&self) -> Result<GridRegion> {
        let step = self
            .step
            .clone()
            .unwrap_or_else(|| vec![1.0; self.origin.len()]);
        Ok(GridRegion::from_slices(&self.origin, &self.counts, &step)?)
    }
}

/// One fill request.
#[derive(Debug, Clone, Deserialize)]
pub struct NoiseJob {
    #[serde(default)]
    pub noise: NoiseConfig,
    pub region: JobRegion,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub max_tier: Option<SimdTier>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl NoiseJob {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        serde_json5::from_str(&text)
            .with_context(|| format!("failed to parse job file {}", path.display()))
    }
}
