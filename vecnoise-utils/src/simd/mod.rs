//! SIMD lane abstraction shared by every noise algorithm.
//!
//! Each instruction-set tier provides a [`Backend`] bundling a float vector, an
//! integer vector and a lane mask. Noise code is written once against these
//! traits and monomorphized per backend inside the tier entry points in
//! [`crate::kernels`].
//!
//! The vector types are crate-private: constructing one for a tier the CPU lacks
//! would execute unsupported instructions, so they are only ever created inside
//! a `#[target_feature]` entry point whose caller has checked the CPU.

use core::fmt;
use core::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) mod scalar;

#[cfg(all(
    target_arch = "x86_64",
    any(feature = "sse2", feature = "sse41", feature = "avx2", feature = "avx512")
))]
pub(crate) mod x86;

#[cfg(all(target_arch = "aarch64", feature = "neon"))]
pub(crate) mod arm;

/// Widest vector width any tier uses, in `f32` lanes.
pub const MAX_LANES: usize = 16;

/// An instruction-set tier a kernel can be compiled for.
///
/// Ordered from narrowest to widest so tiers compare by vector width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimdTier {
    /// Portable scalar code, one lane.
    Scalar,
    /// x86 SSE2, 128-bit.
    Sse2,
    /// ARM NEON, 128-bit.
    Neon,
    /// x86 SSE4.1, 128-bit.
    Sse41,
    /// x86 AVX2, 256-bit.
    Avx2,
    /// x86 AVX-512F, 512-bit.
    Avx512,
}

impl SimdTier {
    /// Every tier, widest first. This is the order the dispatcher tries them in.
    pub const BY_PREFERENCE: [Self; 6] = [
        Self::Avx512,
        Self::Avx2,
        Self::Sse41,
        Self::Sse2,
        Self::Neon,
        Self::Scalar,
    ];

    /// Number of `f32` lanes processed per instruction.
    #[must_use]
    pub const fn lanes(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Sse2 | Self::Sse41 | Self::Neon => 4,
            Self::Avx2 => 8,
            Self::Avx512 => 16,
        }
    }

    /// Vector register width in bytes, also the output alignment this tier requires.
    #[must_use]
    pub const fn width_bytes(self) -> usize {
        self.lanes() * size_of::<f32>()
    }

    /// Lower-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::Neon => "neon",
            Self::Sse41 => "sse41",
            Self::Avx2 => "avx2",
            Self::Avx512 => "avx512",
        }
    }
}

impl fmt::Display for SimdTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown SIMD tier `{0}`")]
pub struct UnknownTier(pub String);

impl FromStr for SimdTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" | "none" => Ok(Self::Scalar),
            "sse2" => Ok(Self::Sse2),
            "sse41" | "sse4.1" => Ok(Self::Sse41),
            "avx2" => Ok(Self::Avx2),
            "avx512" | "avx512f" => Ok(Self::Avx512),
            "neon" => Ok(Self::Neon),
            other => Err(UnknownTier(other.to_owned())),
        }
    }
}

/// Per-lane boolean produced by comparisons.
pub(crate) trait SimdMask:
    Copy + BitAnd<Output = Self> + BitOr<Output = Self> + Not<Output = Self>
{
}

/// Vector of wrapping 32-bit signed integers.
pub(crate) trait SimdInt:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
{
    type Mask: SimdMask;

    fn splat(value: i32) -> Self;
    /// Logical (zero-filling) right shift.
    fn shr(self, bits: u32) -> Self;
    fn cmp_eq(self, rhs: Self) -> Self::Mask;
    fn cmp_gt(self, rhs: Self) -> Self::Mask;
    fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;
}

/// Vector of `f32`.
pub(crate) trait SimdFloat:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    type Int: SimdInt<Mask = Self::Mask>;
    type Mask: SimdMask;

    fn splat(value: f32) -> Self;
    /// Loads the first `LANES` values of `src`.
    fn load(src: &[f32]) -> Self;
    /// Stores into the first `LANES` slots of `dst`.
    fn store(self, dst: &mut [f32]);
    fn min(self, rhs: Self) -> Self;
    fn max(self, rhs: Self) -> Self;
    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn floor(self) -> Self;
    fn cmp_lt(self, rhs: Self) -> Self::Mask;
    fn cmp_gt(self, rhs: Self) -> Self::Mask;
    /// Truncating conversion; `i32::MIN` for NaN and values outside the `i32` range.
    fn to_int(self) -> Self::Int;
    fn from_int(value: Self::Int) -> Self;
    /// Reinterprets the IEEE bits as integers.
    fn to_bits(self) -> Self::Int;
    fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;

    #[inline(always)]
    fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }
}

/// One instruction-set tier.
///
/// Two backends may share vector types and differ only in [`Backend::mul_add`],
/// which is how the FMA variants of a tier are expressed.
pub(crate) trait Backend: Copy + 'static {
    const LANES: usize;
    const TIER: SimdTier;
    const FMA: bool;

    type F32: SimdFloat<Int = Self::I32, Mask = Self::Mask>;
    type I32: SimdInt<Mask = Self::Mask>;
    type Mask: SimdMask;

    /// `a * b + c`, fused on FMA backends.
    fn mul_add(a: Self::F32, b: Self::F32, c: Self::F32) -> Self::F32;
}
