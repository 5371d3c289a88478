//! The [`Noise`] engine: a configuration bound to a kernel, ready to fill.

use vecnoise_utils::{CoordBatch, Lanes, SimdTier};

use crate::buffer::{AlignedBuffer, NoiseGrid};
use crate::config::NoiseConfig;
use crate::detect::{CapabilityDescriptor, detect};
use crate::dispatch::{KernelBinding, bind};
use crate::error::{NoiseError, Result};
use crate::fill::{self, CancelToken, FillOptions, Workers};
use crate::grid::{GridRegion, PointSet};

/// A noise configuration bound to the best kernel for a set of capabilities.
///
/// # Example
/// ```
/// use vecnoise_core::{GridRegion, Noise, NoiseConfig, NoiseType};
///
/// let noise = Noise::new(NoiseConfig::new(NoiseType::Perlin))?;
/// let grid = noise.generate(&GridRegion::new_2d([0.0, 0.0], [64, 64], [1.0, 1.0]))?;
/// assert_eq!(grid.shape(), vec![64, 64]);
/// # Ok::<(), vecnoise_core::NoiseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Noise {
    config: NoiseConfig,
    binding: KernelBinding,
    options: FillOptions,
}

impl Noise {
    /// Binds `config` against the detected CPU.
    pub fn new(config: NoiseConfig) -> Result<Self> {
        Self::with_capabilities(config, detect())
    }

    /// Binds `config` against `capabilities`.
    pub fn with_capabilities(config: NoiseConfig, capabilities: CapabilityDescriptor) -> Result<Self> {
        let binding = bind(capabilities, &config)?;
        Ok(Self {
            config,
            binding,
            options: FillOptions::default(),
        })
    }

    /// Starts a [`NoiseBuilder`].
    #[must_use]
    pub fn builder() -> NoiseBuilder {
        NoiseBuilder::default()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// The bound kernel.
    #[must_use]
    pub const fn binding(&self) -> &KernelBinding {
        &self.binding
    }

    /// Tier of the bound kernel.
    #[must_use]
    pub const fn tier(&self) -> SimdTier {
        self.binding.tier()
    }

    /// Replaces the configuration, rebinding if the algorithm changed.
    ///
    /// On error the engine keeps its previous configuration.
    pub fn set_config(&mut self, config: NoiseConfig) -> Result<()> {
        config.validate()?;
        if config.noise != self.binding.algorithm() {
            self.binding = bind(self.binding.capabilities(), &config)?;
        }
        self.config = config;
        Ok(())
    }

    /// Rebinds against `capabilities`.
    pub fn set_capabilities(&mut self, capabilities: CapabilityDescriptor) -> Result<()> {
        self.binding = bind(capabilities, &self.config)?;
        Ok(())
    }

    /// Where fill tasks run.
    pub fn set_workers(&mut self, workers: Workers) {
        self.options.workers = workers;
    }

    /// Attaches a cancellation token to later fills, or removes it.
    pub fn set_cancel_token(&mut self, cancel: Option<CancelToken>) {
        self.options.cancel = cancel;
    }

    /// Fills a caller buffer aligned to [`KernelBinding::alignment`].
    pub fn fill(&self, region: &GridRegion, out: &mut [f32]) -> Result<()> {
        fill::fill_with(region, &self.config, &self.binding, out, &self.options)
    }

    /// Allocates and fills a grid.
    pub fn generate(&self, region: &GridRegion) -> Result<NoiseGrid> {
        let total = region.validate()?;
        let mut buffer = AlignedBuffer::new(total);
        self.fill(region, &mut buffer)?;
        Ok(NoiseGrid::new(buffer, region.counts(), region.dims()))
    }

    /// Fills `out[i]` with the value at point `i`.
    pub fn fill_points(&self, points: &PointSet<'_>, out: &mut [f32]) -> Result<()> {
        fill::fill_points_with(points, &self.config, &self.binding, out, &self.options)
    }

    /// Allocates and fills one value per point.
    pub fn generate_points(&self, points: &PointSet<'_>) -> Result<AlignedBuffer> {
        let mut buffer = AlignedBuffer::new(points.len());
        self.fill_points(points, &mut buffer)?;
        Ok(buffer)
    }

    /// The value at a single 2, 3 or 4 component point.
    pub fn sample(&self, point: &[f32]) -> Result<f32> {
        let batch = CoordBatch::from_point(point).ok_or_else(|| {
            NoiseError::InvalidRegion(format!("expected 2 to 4 coordinates, got {}", point.len()))
        })?;
        if !point.iter().all(|v| v.is_finite()) {
            return Err(NoiseError::InvalidRegion("point coordinates must be finite".into()));
        }
        let Lanes(values) = self.binding.evaluate(&batch, &self.config)?;
        Ok(values[0])
    }
}

/// Step-by-step construction of a [`Noise`].
#[derive(Debug, Clone, Default)]
pub struct NoiseBuilder {
    config: NoiseConfig,
    capabilities: Option<CapabilityDescriptor>,
    max_tier: Option<SimdTier>,
    workers: Workers,
}

impl NoiseBuilder {
    /// The configuration to bind.
    #[must_use]
    pub fn config(mut self, config: NoiseConfig) -> Self {
        self.config = config;
        self
    }

    /// Capabilities to bind against instead of the detected ones.
    #[must_use]
    pub fn capabilities(mut self, capabilities: CapabilityDescriptor) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Caps the tier the engine may bind.
    #[must_use]
    pub fn max_tier(mut self, tier: SimdTier) -> Self {
        self.max_tier = Some(tier);
        self
    }

    /// Where fill tasks run.
    #[must_use]
    pub fn workers(mut self, workers: Workers) -> Self {
        self.workers = workers;
        self
    }

    /// Binds the configuration.
    pub fn build(self) -> Result<Noise> {
        let mut capabilities = self.capabilities.unwrap_or_else(detect);
        if let Some(max) = self.max_tier {
            capabilities = capabilities.capped_at(max);
        }
        let mut noise = Noise::with_capabilities(self.config, capabilities)?;
        noise.set_workers(self.workers);
        Ok(noise)
    }
}

#[cfg(test)]
mod tests {
    use vecnoise_utils::NoiseType;

    use super::*;

    #[test]
    fn test_set_config_rebinds_on_algorithm_change() {
        let mut noise = Noise::new(NoiseConfig::new(NoiseType::Perlin)).unwrap();
        noise.set_config(NoiseConfig::new(NoiseType::Cellular)).unwrap();
        assert_eq!(noise.binding().algorithm(), NoiseType::Cellular);
        assert_eq!(noise.config().noise, NoiseType::Cellular);
    }

    #[test]
    fn test_set_config_keeps_state_on_error() {
        let mut noise = Noise::new(NoiseConfig::new(NoiseType::Perlin)).unwrap();
        let bad = NoiseConfig {
            octaves: 0,
            ..NoiseConfig::new(NoiseType::Value)
        };
        assert!(noise.set_config(bad).is_err());
        assert_eq!(noise.config().noise, NoiseType::Perlin);
        assert_eq!(noise.binding().algorithm(), NoiseType::Perlin);
    }

    #[test]
    fn test_builder_caps_tier() {
        let noise = Noise::builder().max_tier(SimdTier::Scalar).build().unwrap();
        assert_eq!(noise.tier(), SimdTier::Scalar);
    }

    #[test]
    fn test_sample_validates_point() {
        let noise = Noise::new(NoiseConfig::default()).unwrap();
        assert!(noise.sample(&[1.0]).is_err());
        assert!(noise.sample(&[1.0, f32::NAN]).is_err());
        assert!(noise.sample(&[1.0, 2.0, 3.0]).unwrap().is_finite());
    }

    #[test]
    fn test_sample_matches_generate() {
        let noise = Noise::new(NoiseConfig::new(NoiseType::Simplex)).unwrap();
        let region = GridRegion::new_3d([1.0, 2.0, 3.0], [3, 3, 3], [7.0, 5.0, 3.0]);
        let grid = noise.generate(&region).unwrap();
        let value = grid.get(&[2, 1, 0]).unwrap();
        let direct = noise.sample(&[15.0, 7.0, 3.0]).unwrap();
        assert_eq!(value.to_bits(), direct.to_bits());
    }
}
