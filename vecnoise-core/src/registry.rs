//! Kernel registry.
//!
//! Maps each (algorithm, tier) pair to the compiled kernel implementing it.
//! Kernels are a plain enum rather than trait objects, so evaluating one is a
//! single `match` with no vtable.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use vecnoise_utils::{CoordBatch, Lanes, NoiseParams, NoiseType, SimdTier, kernels};

/// A compiled kernel: one instruction-set tier, with or without FMA.
///
/// Only the variants whose tier was compiled in exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Kernel {
    /// Portable scalar code.
    Scalar,
    /// x86 SSE2.
    #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
    Sse2,
    /// x86 SSE4.1.
    #[cfg(all(target_arch = "x86_64", feature = "sse41"))]
    Sse41,
    /// x86 AVX2.
    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    Avx2,
    /// x86 AVX2 with FMA.
    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    Avx2Fma,
    /// x86 AVX-512F.
    #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
    Avx512,
    /// x86 AVX-512F with FMA.
    #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
    Avx512Fma,
    /// ARM NEON.
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    Neon,
    /// ARM NEON with FMA.
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    NeonFma,
}

impl Kernel {
    /// Every kernel compiled into this build.
    pub const COMPILED: &[Self] = &[
        Self::Scalar,
        #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
        Self::Sse2,
        #[cfg(all(target_arch = "x86_64", feature = "sse41"))]
        Self::Sse41,
        #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
        Self::Avx2,
        #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
        Self::Avx2Fma,
        #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
        Self::Avx512,
        #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
        Self::Avx512Fma,
        #[cfg(all(target_arch = "aarch64", feature = "neon"))]
        Self::Neon,
        #[cfg(all(target_arch = "aarch64", feature = "neon"))]
        Self::NeonFma,
    ];

    /// The tier this kernel was compiled for.
    #[must_use]
    pub const fn tier(self) -> SimdTier {
        match self {
            Self::Scalar => SimdTier::Scalar,
            #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
            Self::Sse2 => SimdTier::Sse2,
            #[cfg(all(target_arch = "x86_64", feature = "sse41"))]
            Self::Sse41 => SimdTier::Sse41,
            #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
            Self::Avx2 | Self::Avx2Fma => SimdTier::Avx2,
            #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
            Self::Avx512 | Self::Avx512Fma => SimdTier::Avx512,
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            Self::Neon | Self::NeonFma => SimdTier::Neon,
        }
    }

    /// Whether this kernel fuses multiply-add.
    #[must_use]
    pub const fn uses_fma(self) -> bool {
        match self {
            #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
            Self::Avx2Fma => true,
            #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
            Self::Avx512Fma => true,
            #[cfg(all(target_arch = "aarch64", feature = "neon"))]
            Self::NeonFma => true,
            _ => false,
        }
    }

    /// Evaluates one batch.
    ///
    /// # Safety
    /// The CPU must support [`Kernel::tier`], and FMA when [`Kernel::uses_fma`].
    #[inline]
    pub(crate) unsafe fn evaluate(self, batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
        // SAFETY: the caller guarantees the CPU supports this kernel's features.
        unsafe {
            match self {
                Self::Scalar => kernels::evaluate_scalar(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "sse2"))]
                Self::Sse2 => kernels::evaluate_sse2(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "sse41"))]
                Self::Sse41 => kernels::evaluate_sse41(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
                Self::Avx2 => kernels::evaluate_avx2(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
                Self::Avx2Fma => kernels::evaluate_avx2_fma(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
                Self::Avx512 => kernels::evaluate_avx512(batch, params, out),
                #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
                Self::Avx512Fma => kernels::evaluate_avx512_fma(batch, params, out),
                #[cfg(all(target_arch = "aarch64", feature = "neon"))]
                Self::Neon => kernels::evaluate_neon(batch, params, out),
                #[cfg(all(target_arch = "aarch64", feature = "neon"))]
                Self::NeonFma => kernels::evaluate_neon_fma(batch, params, out),
            }
        }
    }
}

/// Kernels registered for one (algorithm, tier) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TierKernels {
    plain: Option<Kernel>,
    fma: Option<Kernel>,
}

/// Immutable lookup from (algorithm, tier) to kernel.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    entries: FxHashMap<(NoiseType, SimdTier), TierKernels>,
}

impl KernelRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> KernelRegistryBuilder {
        KernelRegistryBuilder::default()
    }

    /// A registry with every compiled kernel registered for every algorithm.
    #[must_use]
    pub fn compiled() -> Self {
        Self::builder().with_compiled_kernels().build()
    }

    /// The kernel for `noise` on `tier`, preferring the FMA variant when `fma`
    /// is set and one exists.
    #[must_use]
    pub fn lookup(&self, noise: NoiseType, tier: SimdTier, fma: bool) -> Option<Kernel> {
        let entry = self.entries.get(&(noise, tier))?;
        if fma {
            entry.fma.or(entry.plain)
        } else {
            entry.plain
        }
    }

    /// Tiers with at least one kernel for `noise`, widest first.
    pub fn tiers_for(&self, noise: NoiseType) -> impl Iterator<Item = SimdTier> + '_ {
        SimdTier::BY_PREFERENCE
            .into_iter()
            .filter(move |tier| self.entries.contains_key(&(noise, *tier)))
    }

    /// Number of registered kernels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|e| usize::from(e.plain.is_some()) + usize::from(e.fma.is_some()))
            .sum()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects kernels for a [`KernelRegistry`].
#[derive(Debug, Default)]
pub struct KernelRegistryBuilder {
    entries: FxHashMap<(NoiseType, SimdTier), TierKernels>,
}

impl KernelRegistryBuilder {
    /// Registers `kernel` for `noise` under the kernel's own tier.
    #[must_use]
    pub fn register(mut self, noise: NoiseType, kernel: Kernel) -> Self {
        let entry = self.entries.entry((noise, kernel.tier())).or_default();
        if kernel.uses_fma() {
            entry.fma = Some(kernel);
        } else {
            entry.plain = Some(kernel);
        }
        self
    }

    /// Registers every compiled kernel for every algorithm.
    #[must_use]
    pub fn with_compiled_kernels(mut self) -> Self {
        for noise in NoiseType::ALL {
            for kernel in Kernel::COMPILED {
                self = self.register(noise, *kernel);
            }
        }
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> KernelRegistry {
        KernelRegistry {
            entries: self.entries,
        }
    }
}

static GLOBAL: LazyLock<KernelRegistry> = LazyLock::new(|| {
    let registry = KernelRegistry::compiled();
    log::debug!("Kernel registry built with {} kernels", registry.len());
    registry
});

/// The process-wide registry of compiled kernels.
pub fn global() -> &'static KernelRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_always_has_scalar() {
        assert_eq!(Kernel::COMPILED[0], Kernel::Scalar);
        for noise in NoiseType::ALL {
            assert_eq!(global().lookup(noise, SimdTier::Scalar, true), Some(Kernel::Scalar));
        }
    }

    #[test]
    fn test_global_covers_every_compiled_kernel() {
        assert_eq!(global().len(), Kernel::COMPILED.len() * NoiseType::ALL.len());
    }

    #[test]
    fn test_register_splits_fma() {
        let registry = KernelRegistry::builder()
            .register(NoiseType::Perlin, Kernel::Scalar)
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(NoiseType::Perlin, SimdTier::Scalar, false), Some(Kernel::Scalar));
        assert_eq!(registry.lookup(NoiseType::Simplex, SimdTier::Scalar, false), None);
        assert_eq!(registry.tiers_for(NoiseType::Perlin).collect::<Vec<_>>(), vec![SimdTier::Scalar]);
    }

    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    #[test]
    fn test_lookup_prefers_fma() {
        let registry = KernelRegistry::builder()
            .register(NoiseType::Value, Kernel::Avx2)
            .register(NoiseType::Value, Kernel::Avx2Fma)
            .build();
        assert_eq!(registry.lookup(NoiseType::Value, SimdTier::Avx2, true), Some(Kernel::Avx2Fma));
        assert_eq!(registry.lookup(NoiseType::Value, SimdTier::Avx2, false), Some(Kernel::Avx2));
    }

    #[test]
    fn test_empty_registry() {
        assert!(KernelRegistry::builder().build().is_empty());
    }
}
