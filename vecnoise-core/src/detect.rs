//! CPU feature detection.
//!
//! The hardware is queried once per process and cached. The result can be capped
//! through the `VECNOISE_MAX_TIER` environment variable, read on first
//! detection, and per engine through [`CapabilityDescriptor::capped_at`].

use std::env;
use std::sync::OnceLock;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use vecnoise_utils::SimdTier;

/// Environment variable capping the detected tier.
pub const MAX_TIER_ENV: &str = "VECNOISE_MAX_TIER";

bitflags! {
    /// Instruction-set extensions relevant to noise kernels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CpuFeatures: u32 {
        /// x86 SSE2.
        const SSE2 = 1 << 0;
        /// x86 SSE4.1.
        const SSE41 = 1 << 1;
        /// x86 AVX2.
        const AVX2 = 1 << 2;
        /// x86 AVX-512 Foundation.
        const AVX512F = 1 << 3;
        /// Fused multiply-add.
        const FMA = 1 << 4;
        /// ARM Advanced SIMD.
        const NEON = 1 << 5;
    }
}

impl CpuFeatures {
    /// Extensions a tier needs, including those of the tiers it builds on.
    #[must_use]
    pub const fn required_for(tier: SimdTier) -> Self {
        match tier {
            SimdTier::Scalar => Self::empty(),
            SimdTier::Sse2 => Self::SSE2,
            SimdTier::Sse41 => Self::SSE2.union(Self::SSE41),
            SimdTier::Avx2 => Self::SSE2.union(Self::SSE41).union(Self::AVX2),
            SimdTier::Avx512 => Self::SSE2
                .union(Self::SSE41)
                .union(Self::AVX2)
                .union(Self::AVX512F),
            SimdTier::Neon => Self::NEON,
        }
    }

    /// The extension that introduces `tier`.
    const fn introduced_by(tier: SimdTier) -> Self {
        match tier {
            SimdTier::Scalar => Self::empty(),
            SimdTier::Sse2 => Self::SSE2,
            SimdTier::Sse41 => Self::SSE41,
            SimdTier::Avx2 => Self::AVX2,
            SimdTier::Avx512 => Self::AVX512F,
            SimdTier::Neon => Self::NEON,
        }
    }
}

/// What the running CPU can execute.
///
/// Obtained from [`detect`]. The public constructors can only take capabilities
/// away, so a descriptor never claims support the hardware lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityDescriptor {
    features: CpuFeatures,
}

impl CapabilityDescriptor {
    /// A descriptor with no vector support at all.
    #[must_use]
    pub const fn scalar_only() -> Self {
        Self {
            features: CpuFeatures::empty(),
        }
    }

    /// Removes every tier wider than `max`.
    #[must_use]
    pub fn capped_at(self, max: SimdTier) -> Self {
        let mut features = self.features;
        for tier in SimdTier::BY_PREFERENCE {
            if tier > max {
                features.remove(CpuFeatures::introduced_by(tier));
            }
        }
        Self { features }
    }

    /// Removes fused multiply-add.
    #[must_use]
    pub fn without_fma(self) -> Self {
        Self {
            features: self.features.difference(CpuFeatures::FMA),
        }
    }

    /// The raw feature set.
    #[must_use]
    pub const fn features(&self) -> CpuFeatures {
        self.features
    }

    /// Whether kernels of `tier` may run.
    #[must_use]
    pub const fn supports(&self, tier: SimdTier) -> bool {
        self.features.contains(CpuFeatures::required_for(tier))
    }

    /// Whether fused multiply-add is available.
    #[must_use]
    pub const fn has_fma(&self) -> bool {
        self.features.contains(CpuFeatures::FMA)
    }

    /// Supported tiers, widest first. Always ends with [`SimdTier::Scalar`].
    pub fn tiers(&self) -> impl Iterator<Item = SimdTier> + '_ {
        SimdTier::BY_PREFERENCE
            .into_iter()
            .filter(|tier| self.supports(*tier))
    }

    /// The widest supported tier.
    #[must_use]
    pub fn best_tier(&self) -> SimdTier {
        self.tiers().next().unwrap_or(SimdTier::Scalar)
    }
}

/// Probes the hardware without caching or overrides.
#[must_use]
pub fn detect_hardware() -> CapabilityDescriptor {
    CapabilityDescriptor {
        features: read_cpu_features(),
    }
}

#[cfg(target_arch = "x86_64")]
fn read_cpu_features() -> CpuFeatures {
    use std::arch::is_x86_feature_detected;

    let checks = [
        (is_x86_feature_detected!("sse2"), CpuFeatures::SSE2),
        (is_x86_feature_detected!("sse4.1"), CpuFeatures::SSE41),
        (is_x86_feature_detected!("avx2"), CpuFeatures::AVX2),
        (is_x86_feature_detected!("avx512f"), CpuFeatures::AVX512F),
        (is_x86_feature_detected!("fma"), CpuFeatures::FMA),
    ];
    let mut features = CpuFeatures::empty();
    for (present, flag) in checks {
        features.set(flag, present);
    }
    features
}

#[cfg(target_arch = "aarch64")]
fn read_cpu_features() -> CpuFeatures {
    // Fused multiply-add is part of Advanced SIMD on aarch64.
    use std::arch::is_aarch64_feature_detected;

    if is_aarch64_feature_detected!("neon") {
        CpuFeatures::NEON | CpuFeatures::FMA
    } else {
        CpuFeatures::empty()
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
const fn read_cpu_features() -> CpuFeatures {
    CpuFeatures::empty()
}

static DETECTED: OnceLock<CapabilityDescriptor> = OnceLock::new();

/// The capabilities of this CPU, queried once per process.
///
/// Never fails: an unrecognised CPU reports scalar only.
pub fn detect() -> CapabilityDescriptor {
    *DETECTED.get_or_init(|| {
        let hardware = detect_hardware();
        log::debug!("Detected CPU features: {:?}", hardware.features());
        apply_override(hardware, env::var(MAX_TIER_ENV).ok().as_deref())
    })
}

fn apply_override(hardware: CapabilityDescriptor, value: Option<&str>) -> CapabilityDescriptor {
    let Some(value) = value else {
        return hardware;
    };
    match value.parse::<SimdTier>() {
        Ok(max) => {
            let capped = hardware.capped_at(max);
            log::info!(
                "{MAX_TIER_ENV}={value}: best tier {} (hardware {})",
                capped.best_tier(),
                hardware.best_tier()
            );
            capped
        }
        Err(e) => {
            log::warn!("Ignoring {MAX_TIER_ENV}: {e}");
            hardware
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> CapabilityDescriptor {
        CapabilityDescriptor {
            features: CpuFeatures::all(),
        }
    }

    #[test]
    fn test_scalar_only() {
        let caps = CapabilityDescriptor::scalar_only();
        assert_eq!(caps.tiers().collect::<Vec<_>>(), vec![SimdTier::Scalar]);
        assert!(!caps.has_fma());
    }

    #[test]
    fn test_capped_at_removes_wider_tiers() {
        let caps = all().capped_at(SimdTier::Sse41);
        assert!(caps.supports(SimdTier::Sse41));
        assert!(caps.supports(SimdTier::Sse2));
        assert!(!caps.supports(SimdTier::Avx2));
        assert!(!caps.supports(SimdTier::Avx512));
        assert_eq!(caps.best_tier(), SimdTier::Sse41);
    }

    #[test]
    fn test_capping_never_adds() {
        let caps = CapabilityDescriptor::scalar_only().capped_at(SimdTier::Avx512);
        assert_eq!(caps, CapabilityDescriptor::scalar_only());
    }

    #[test]
    fn test_without_fma() {
        let caps = all().without_fma();
        assert!(!caps.has_fma());
        assert!(caps.supports(SimdTier::Avx512));
    }

    #[test]
    fn test_avx512_requires_lower_tiers() {
        let caps = all().capped_at(SimdTier::Avx512);
        let missing_sse41 = CapabilityDescriptor {
            features: caps.features().difference(CpuFeatures::SSE41),
        };
        assert!(!missing_sse41.supports(SimdTier::Avx512));
    }

    #[test]
    fn test_detect_is_cached() {
        assert_eq!(detect(), detect());
        assert_eq!(detect_hardware(), detect_hardware());
        #[cfg(target_arch = "x86_64")]
        assert!(detect_hardware().supports(SimdTier::Sse2));
    }

    #[test]
    fn test_override() {
        let hardware = all();
        assert_eq!(apply_override(hardware, None), hardware);
        assert_eq!(apply_override(hardware, Some("sse41")).best_tier(), SimdTier::Sse41);
        assert_eq!(apply_override(hardware, Some("scalar")).best_tier(), SimdTier::Scalar);
        assert_eq!(apply_override(hardware, Some("bogus")), hardware);
    }
}
