//! Kernel selection.
//!
//! [`bind`] walks the tiers a [`CapabilityDescriptor`] supports from widest to
//! narrowest and binds the first kernel the registry has for the configured
//! algorithm, taking the FMA variant when the CPU has FMA.

use vecnoise_utils::{CoordBatch, Lanes, NoiseParams, NoiseType, SimdTier};

use crate::config::NoiseConfig;
use crate::detect::CapabilityDescriptor;
use crate::error::{NoiseError, Result};
use crate::registry::{self, Kernel, KernelRegistry};

/// A kernel chosen for one algorithm on one set of capabilities.
///
/// Can only be created by [`bind`] or [`bind_with`], so the kernel it holds is
/// always executable on this CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelBinding {
    kernel: Kernel,
    algorithm: NoiseType,
    capabilities: CapabilityDescriptor,
}

impl KernelBinding {
    /// The bound kernel.
    #[must_use]
    pub const fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The kernel's tier.
    #[must_use]
    pub const fn tier(&self) -> SimdTier {
        self.kernel.tier()
    }

    /// The algorithm this binding was made for.
    #[must_use]
    pub const fn algorithm(&self) -> NoiseType {
        self.algorithm
    }

    /// The capabilities the kernel was selected against.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilityDescriptor {
        self.capabilities
    }

    /// Output alignment in bytes required by [`crate::fill`].
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.tier().width_bytes()
    }

    /// Lanes per vector instruction.
    #[must_use]
    pub const fn lanes(&self) -> usize {
        self.tier().lanes()
    }

    /// Evaluates one batch for `config`.
    pub fn evaluate(&self, batch: &CoordBatch, config: &NoiseConfig) -> Result<Lanes> {
        let params = config.prepare()?;
        self.check_algorithm(params.noise)?;
        let mut out = Lanes::ZERO;
        self.evaluate_prepared(batch, &params, &mut out);
        Ok(out)
    }

    /// Evaluates one batch with already validated parameters.
    #[inline]
    pub fn evaluate_prepared(&self, batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
        // SAFETY: bindings are only created for kernels whose tier (and FMA use)
        // the capability descriptor reports, and descriptors never exceed the hardware.
        unsafe { self.kernel.evaluate(batch, params, out) }
    }

    pub(crate) fn check_algorithm(&self, requested: NoiseType) -> Result<()> {
        if requested == self.algorithm {
            Ok(())
        } else {
            Err(NoiseError::InvalidConfig(format!(
                "binding was made for {:?} but the configuration requests {requested:?}",
                self.algorithm
            )))
        }
    }
}

/// Binds `config`'s algorithm against the global registry.
pub fn bind(capabilities: CapabilityDescriptor, config: &NoiseConfig) -> Result<KernelBinding> {
    bind_with(registry::global(), capabilities, config)
}

/// Binds `config`'s algorithm against `registry`.
pub fn bind_with(
    registry: &KernelRegistry,
    capabilities: CapabilityDescriptor,
    config: &NoiseConfig,
) -> Result<KernelBinding> {
    config.validate()?;
    let algorithm = config.noise;
    let fma = capabilities.has_fma();

    let kernel = capabilities
        .tiers()
        .find_map(|tier| registry.lookup(algorithm, tier, fma))
        .ok_or(NoiseError::UnsupportedAlgorithm { algorithm })?;

    log::debug!(
        "Bound {algorithm:?} to {:?} (tier {}, fma {})",
        kernel,
        kernel.tier(),
        kernel.uses_fma()
    );
    Ok(KernelBinding {
        kernel,
        algorithm,
        capabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect;
    use vecnoise_utils::Dims;

    #[test]
    fn test_scalar_only_binds_scalar() {
        for noise in NoiseType::ALL {
            let binding = bind(CapabilityDescriptor::scalar_only(), &NoiseConfig::new(noise)).unwrap();
            assert_eq!(binding.kernel(), Kernel::Scalar);
            assert_eq!(binding.alignment(), 4);
            assert_eq!(binding.algorithm(), noise);
        }
    }

    #[test]
    fn test_binds_best_detected_tier() {
        let caps = detect();
        let binding = bind(caps, &NoiseConfig::default()).unwrap();
        let compiled_best = caps
            .tiers()
            .find(|tier| Kernel::COMPILED.iter().any(|k| k.tier() == *tier))
            .unwrap();
        assert_eq!(binding.tier(), compiled_best);
        if binding.tier() != SimdTier::Scalar && caps.has_fma() {
            let has_fma_variant = Kernel::COMPILED
                .iter()
                .any(|k| k.tier() == binding.tier() && k.uses_fma());
            assert_eq!(binding.kernel().uses_fma(), has_fma_variant);
        }
    }

    #[test]
    fn test_without_fma_never_binds_fma() {
        let binding = bind(detect().without_fma(), &NoiseConfig::default()).unwrap();
        assert!(!binding.kernel().uses_fma());
    }

    #[test]
    fn test_empty_registry_is_unsupported() {
        let registry = KernelRegistry::builder().build();
        let err = bind_with(&registry, detect(), &NoiseConfig::new(NoiseType::Cubic)).unwrap_err();
        assert_eq!(err, NoiseError::UnsupportedAlgorithm { algorithm: NoiseType::Cubic });
    }

    #[test]
    fn test_falls_back_past_missing_tiers() {
        let registry = KernelRegistry::builder()
            .register(NoiseType::Perlin, Kernel::Scalar)
            .build();
        let binding = bind_with(&registry, detect(), &NoiseConfig::new(NoiseType::Perlin)).unwrap();
        assert_eq!(binding.kernel(), Kernel::Scalar);
    }

    #[test]
    fn test_invalid_config_rejected_before_binding() {
        let config = NoiseConfig {
            octaves: 0,
            ..NoiseConfig::default()
        };
        assert!(matches!(
            bind(detect(), &config),
            Err(NoiseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_evaluate_rejects_other_algorithm() {
        let binding = bind(detect(), &NoiseConfig::new(NoiseType::Perlin)).unwrap();
        let batch = CoordBatch::new(Dims::Two);
        assert!(binding.evaluate(&batch, &NoiseConfig::new(NoiseType::Value)).is_err());
        assert!(binding.evaluate(&batch, &NoiseConfig::new(NoiseType::Perlin)).is_ok());
    }
}
