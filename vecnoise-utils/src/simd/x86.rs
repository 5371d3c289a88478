//! x86_64 backends: SSE2, SSE4.1, AVX2 and AVX-512F.
//!
//! SSE2 and SSE4.1 share the 128-bit vector types, parameterised by whether
//! SSE4.1 instructions (`roundps`, `pmulld`, `blendvps`) may be used. The FMA
//! variants of AVX2 and AVX-512 share their tier's vector types and only differ
//! in [`Backend::mul_add`].

use core::arch::x86_64::*;
use core::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};

use super::{Backend, SimdFloat, SimdInt, SimdMask, SimdTier};

/// Implements a lane-wise binary operator through an intrinsic.
macro_rules! intrinsic_binop {
    ([$($generics:tt)*] $ty:ty, $trait:ident, $method:ident, $intrinsic:ident) => {
        impl<$($generics)*> $trait for $ty {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                // SAFETY: values of this type only exist inside entry points
                // compiled for, and gated on, the matching CPU features.
                unsafe { Self($intrinsic(self.0, rhs.0)) }
            }
        }
    };
}

// ── 128-bit (SSE2 / SSE4.1) ─────────────────────────────────────────────────

#[cfg(any(feature = "sse2", feature = "sse41"))]
mod sse {
    use super::*;

    /// SSE2 backend (4 lanes), floor and integer multiply emulated.
    #[cfg(feature = "sse2")]
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Sse2;

    #[cfg(feature = "sse2")]
    impl Backend for Sse2 {
        const LANES: usize = 4;
        const TIER: SimdTier = SimdTier::Sse2;
        const FMA: bool = false;

        type F32 = F32x4<false>;
        type I32 = I32x4<false>;
        type Mask = M32x4;

        #[inline(always)]
        fn mul_add(a: Self::F32, b: Self::F32, c: Self::F32) -> Self::F32 {
            a * b + c
        }
    }

    /// SSE4.1 backend (4 lanes).
    #[cfg(feature = "sse41")]
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Sse41;

    #[cfg(feature = "sse41")]
    impl Backend for Sse41 {
        const LANES: usize = 4;
        const TIER: SimdTier = SimdTier::Sse41;
        const FMA: bool = false;

        type F32 = F32x4<true>;
        type I32 = I32x4<true>;
        type Mask = M32x4;

        #[inline(always)]
        fn mul_add(a: Self::F32, b: Self::F32, c: Self::F32) -> Self::F32 {
            a * b + c
        }
    }

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct F32x4<const SSE41: bool>(__m128);

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct I32x4<const SSE41: bool>(__m128i);

    /// All-ones / all-zeros lanes in the float domain.
    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct M32x4(__m128);

    intrinsic_binop!([const SSE41: bool] F32x4<SSE41>, Add, add, _mm_add_ps);
    intrinsic_binop!([const SSE41: bool] F32x4<SSE41>, Sub, sub, _mm_sub_ps);
    intrinsic_binop!([const SSE41: bool] F32x4<SSE41>, Mul, mul, _mm_mul_ps);
    intrinsic_binop!([const SSE41: bool] F32x4<SSE41>, Div, div, _mm_div_ps);
    intrinsic_binop!([const SSE41: bool] I32x4<SSE41>, Add, add, _mm_add_epi32);
    intrinsic_binop!([const SSE41: bool] I32x4<SSE41>, Sub, sub, _mm_sub_epi32);
    intrinsic_binop!([const SSE41: bool] I32x4<SSE41>, BitAnd, bitand, _mm_and_si128);
    intrinsic_binop!([const SSE41: bool] I32x4<SSE41>, BitOr, bitor, _mm_or_si128);
    intrinsic_binop!([const SSE41: bool] I32x4<SSE41>, BitXor, bitxor, _mm_xor_si128);
    intrinsic_binop!([] M32x4, BitAnd, bitand, _mm_and_ps);
    intrinsic_binop!([] M32x4, BitOr, bitor, _mm_or_ps);

    impl SimdMask for M32x4 {}

    impl Not for M32x4 {
        type Output = Self;

        #[inline(always)]
        fn not(self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_xor_ps(self.0, _mm_castsi128_ps(_mm_set1_epi32(-1)))) }
        }
    }

    impl<const SSE41: bool> Neg for F32x4<SSE41> {
        type Output = Self;

        #[inline(always)]
        fn neg(self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_xor_ps(self.0, _mm_set1_ps(-0.0))) }
        }
    }

    impl<const SSE41: bool> Mul for I32x4<SSE41> {
        type Output = Self;

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            // SAFETY: the SSE4.1 path is only instantiated by the `Sse41` backend,
            // whose entry point enables `sse4.1`; the other path is plain SSE2.
            unsafe {
                if SSE41 {
                    Self(_mm_mullo_epi32(self.0, rhs.0))
                } else {
                    let even = _mm_mul_epu32(self.0, rhs.0);
                    let odd = _mm_mul_epu32(_mm_srli_si128::<4>(self.0), _mm_srli_si128::<4>(rhs.0));
                    Self(_mm_unpacklo_epi32(
                        _mm_shuffle_epi32::<0b00_00_10_00>(even),
                        _mm_shuffle_epi32::<0b00_00_10_00>(odd),
                    ))
                }
            }
        }
    }

    #[inline(always)]
    unsafe fn blend<const SSE41: bool>(mask: __m128, if_true: __m128, if_false: __m128) -> __m128 {
        // SAFETY: forwarded from the caller, see `Mul for I32x4`.
        unsafe {
            if SSE41 {
                _mm_blendv_ps(if_false, if_true, mask)
            } else {
                _mm_or_ps(_mm_and_ps(mask, if_true), _mm_andnot_ps(mask, if_false))
            }
        }
    }

    impl<const SSE41: bool> SimdInt for I32x4<SSE41> {
        type Mask = M32x4;

        #[inline(always)]
        fn splat(value: i32) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_set1_epi32(value)) }
        }

        #[inline(always)]
        fn shr(self, bits: u32) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_srl_epi32(self.0, _mm_cvtsi32_si128(bits as i32))) }
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> M32x4 {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { M32x4(_mm_castsi128_ps(_mm_cmpeq_epi32(self.0, rhs.0))) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x4 {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { M32x4(_mm_castsi128_ps(_mm_cmpgt_epi32(self.0, rhs.0))) }
        }

        #[inline(always)]
        fn select(mask: M32x4, if_true: Self, if_false: Self) -> Self {
            // SAFETY: see `blend`.
            unsafe {
                Self(_mm_castps_si128(blend::<SSE41>(
                    mask.0,
                    _mm_castsi128_ps(if_true.0),
                    _mm_castsi128_ps(if_false.0),
                )))
            }
        }
    }

    impl<const SSE41: bool> SimdFloat for F32x4<SSE41> {
        type Int = I32x4<SSE41>;
        type Mask = M32x4;

        #[inline(always)]
        fn splat(value: f32) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_set1_ps(value)) }
        }

        #[inline(always)]
        fn load(src: &[f32]) -> Self {
            assert!(src.len() >= 4);
            // SAFETY: bounds checked above; unaligned load.
            unsafe { Self(_mm_loadu_ps(src.as_ptr())) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= 4);
            // SAFETY: bounds checked above; unaligned store.
            unsafe { _mm_storeu_ps(dst.as_mut_ptr(), self.0) }
        }

        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_min_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_max_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn abs(self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_andnot_ps(_mm_set1_ps(-0.0), self.0)) }
        }

        #[inline(always)]
        fn sqrt(self) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_sqrt_ps(self.0)) }
        }

        #[inline(always)]
        fn floor(self) -> Self {
            // SAFETY: see `Mul for I32x4`.
            unsafe {
                if SSE41 {
                    Self(_mm_floor_ps(self.0))
                } else {
                    // Truncate, then step down where truncation rounded up.
                    let truncated = _mm_cvtepi32_ps(_mm_cvttps_epi32(self.0));
                    let rounded_up = _mm_cmplt_ps(self.0, truncated);
                    let emulated =
                        _mm_sub_ps(truncated, _mm_and_ps(rounded_up, _mm_set1_ps(1.0)));
                    // From 2^23 up every float is integral; NaN also passes through.
                    let magnitude = _mm_andnot_ps(_mm_set1_ps(-0.0), self.0);
                    let integral = _mm_cmpnlt_ps(magnitude, _mm_set1_ps(8_388_608.0));
                    Self(_mm_or_ps(
                        _mm_and_ps(integral, self.0),
                        _mm_andnot_ps(integral, emulated),
                    ))
                }
            }
        }

        #[inline(always)]
        fn cmp_lt(self, rhs: Self) -> M32x4 {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { M32x4(_mm_cmplt_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x4 {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { M32x4(_mm_cmpgt_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn to_int(self) -> I32x4<SSE41> {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { I32x4(_mm_cvttps_epi32(self.0)) }
        }

        #[inline(always)]
        fn from_int(value: I32x4<SSE41>) -> Self {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { Self(_mm_cvtepi32_ps(value.0)) }
        }

        #[inline(always)]
        fn to_bits(self) -> I32x4<SSE41> {
            // SAFETY: SSE2 is part of the x86_64 baseline.
            unsafe { I32x4(_mm_castps_si128(self.0)) }
        }

        #[inline(always)]
        fn select(mask: M32x4, if_true: Self, if_false: Self) -> Self {
            // SAFETY: see `blend`.
            unsafe { Self(blend::<SSE41>(mask.0, if_true.0, if_false.0)) }
        }
    }

}

#[cfg(feature = "sse2")]
pub(crate) use sse::Sse2;
#[cfg(feature = "sse41")]
pub(crate) use sse::Sse41;

// ── 256-bit (AVX2) ──────────────────────────────────────────────────────────

#[cfg(feature = "avx2")]
mod avx2 {
    use super::*;

    /// AVX2 backend (8 lanes), separate multiply and add.
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Avx2;

    /// AVX2 backend (8 lanes) with fused multiply-add.
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Avx2Fma;

    impl Backend for Avx2 {
        const LANES: usize = 8;
        const TIER: SimdTier = SimdTier::Avx2;
        const FMA: bool = false;

        type F32 = F32x8;
        type I32 = I32x8;
        type Mask = M32x8;

        #[inline(always)]
        fn mul_add(a: F32x8, b: F32x8, c: F32x8) -> F32x8 {
            a * b + c
        }
    }

    impl Backend for Avx2Fma {
        const LANES: usize = 8;
        const TIER: SimdTier = SimdTier::Avx2;
        const FMA: bool = true;

        type F32 = F32x8;
        type I32 = I32x8;
        type Mask = M32x8;

        #[inline(always)]
        fn mul_add(a: F32x8, b: F32x8, c: F32x8) -> F32x8 {
            // SAFETY: only instantiated by the entry point enabling `avx2,fma`.
            unsafe { F32x8(_mm256_fmadd_ps(a.0, b.0, c.0)) }
        }
    }

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct F32x8(__m256);

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct I32x8(__m256i);

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct M32x8(__m256);

    intrinsic_binop!([] F32x8, Add, add, _mm256_add_ps);
    intrinsic_binop!([] F32x8, Sub, sub, _mm256_sub_ps);
    intrinsic_binop!([] F32x8, Mul, mul, _mm256_mul_ps);
    intrinsic_binop!([] F32x8, Div, div, _mm256_div_ps);
    intrinsic_binop!([] I32x8, Add, add, _mm256_add_epi32);
    intrinsic_binop!([] I32x8, Sub, sub, _mm256_sub_epi32);
    intrinsic_binop!([] I32x8, Mul, mul, _mm256_mullo_epi32);
    intrinsic_binop!([] I32x8, BitAnd, bitand, _mm256_and_si256);
    intrinsic_binop!([] I32x8, BitOr, bitor, _mm256_or_si256);
    intrinsic_binop!([] I32x8, BitXor, bitxor, _mm256_xor_si256);
    intrinsic_binop!([] M32x8, BitAnd, bitand, _mm256_and_ps);
    intrinsic_binop!([] M32x8, BitOr, bitor, _mm256_or_ps);

    impl SimdMask for M32x8 {}

    impl Not for M32x8 {
        type Output = Self;

        #[inline(always)]
        fn not(self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_xor_ps(self.0, _mm256_castsi256_ps(_mm256_set1_epi32(-1)))) }
        }
    }

    impl Neg for F32x8 {
        type Output = Self;

        #[inline(always)]
        fn neg(self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_xor_ps(self.0, _mm256_set1_ps(-0.0))) }
        }
    }

    impl SimdInt for I32x8 {
        type Mask = M32x8;

        #[inline(always)]
        fn splat(value: i32) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_set1_epi32(value)) }
        }

        #[inline(always)]
        fn shr(self, bits: u32) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_srl_epi32(self.0, _mm_cvtsi32_si128(bits as i32))) }
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> M32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { M32x8(_mm256_castsi256_ps(_mm256_cmpeq_epi32(self.0, rhs.0))) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { M32x8(_mm256_castsi256_ps(_mm256_cmpgt_epi32(self.0, rhs.0))) }
        }

        #[inline(always)]
        fn select(mask: M32x8, if_true: Self, if_false: Self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe {
                Self(_mm256_castps_si256(_mm256_blendv_ps(
                    _mm256_castsi256_ps(if_false.0),
                    _mm256_castsi256_ps(if_true.0),
                    mask.0,
                )))
            }
        }
    }

    impl SimdFloat for F32x8 {
        type Int = I32x8;
        type Mask = M32x8;

        #[inline(always)]
        fn splat(value: f32) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_set1_ps(value)) }
        }

        #[inline(always)]
        fn load(src: &[f32]) -> Self {
            assert!(src.len() >= 8);
            // SAFETY: bounds checked above; unaligned load.
            unsafe { Self(_mm256_loadu_ps(src.as_ptr())) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= 8);
            // SAFETY: bounds checked above; unaligned store.
            unsafe { _mm256_storeu_ps(dst.as_mut_ptr(), self.0) }
        }

        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_min_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_max_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn abs(self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_andnot_ps(_mm256_set1_ps(-0.0), self.0)) }
        }

        #[inline(always)]
        fn sqrt(self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_sqrt_ps(self.0)) }
        }

        #[inline(always)]
        fn floor(self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_floor_ps(self.0)) }
        }

        #[inline(always)]
        fn cmp_lt(self, rhs: Self) -> M32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { M32x8(_mm256_cmp_ps::<_CMP_LT_OQ>(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { M32x8(_mm256_cmp_ps::<_CMP_GT_OQ>(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn to_int(self) -> I32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { I32x8(_mm256_cvttps_epi32(self.0)) }
        }

        #[inline(always)]
        fn from_int(value: I32x8) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_cvtepi32_ps(value.0)) }
        }

        #[inline(always)]
        fn to_bits(self) -> I32x8 {
            // SAFETY: AVX2 entry points only.
            unsafe { I32x8(_mm256_castps_si256(self.0)) }
        }

        #[inline(always)]
        fn select(mask: M32x8, if_true: Self, if_false: Self) -> Self {
            // SAFETY: AVX2 entry points only.
            unsafe { Self(_mm256_blendv_ps(if_false.0, if_true.0, mask.0)) }
        }
    }
}

#[cfg(feature = "avx2")]
pub(crate) use avx2::{Avx2, Avx2Fma};

// ── 512-bit (AVX-512F) ──────────────────────────────────────────────────────

#[cfg(feature = "avx512")]
mod avx512 {
    use super::*;

    /// `roundscale` immediate: round toward negative infinity, suppress exceptions.
    const ROUND_FLOOR: i32 = _MM_FROUND_TO_NEG_INF | _MM_FROUND_NO_EXC;

    /// AVX-512F backend (16 lanes), separate multiply and add.
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Avx512;

    /// AVX-512F backend (16 lanes) with fused multiply-add.
    #[derive(Copy, Clone, Debug, Default)]
    pub(crate) struct Avx512Fma;

    impl Backend for Avx512 {
        const LANES: usize = 16;
        const TIER: SimdTier = SimdTier::Avx512;
        const FMA: bool = false;

        type F32 = F32x16;
        type I32 = I32x16;
        type Mask = M32x16;

        #[inline(always)]
        fn mul_add(a: F32x16, b: F32x16, c: F32x16) -> F32x16 {
            a * b + c
        }
    }

    impl Backend for Avx512Fma {
        const LANES: usize = 16;
        const TIER: SimdTier = SimdTier::Avx512;
        const FMA: bool = true;

        type F32 = F32x16;
        type I32 = I32x16;
        type Mask = M32x16;

        #[inline(always)]
        fn mul_add(a: F32x16, b: F32x16, c: F32x16) -> F32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { F32x16(_mm512_fmadd_ps(a.0, b.0, c.0)) }
        }
    }

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct F32x16(__m512);

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct I32x16(__m512i);

    #[derive(Copy, Clone)]
    #[repr(transparent)]
    pub(crate) struct M32x16(__mmask16);

    intrinsic_binop!([] F32x16, Add, add, _mm512_add_ps);
    intrinsic_binop!([] F32x16, Sub, sub, _mm512_sub_ps);
    intrinsic_binop!([] F32x16, Mul, mul, _mm512_mul_ps);
    intrinsic_binop!([] F32x16, Div, div, _mm512_div_ps);
    intrinsic_binop!([] I32x16, Add, add, _mm512_add_epi32);
    intrinsic_binop!([] I32x16, Sub, sub, _mm512_sub_epi32);
    intrinsic_binop!([] I32x16, Mul, mul, _mm512_mullo_epi32);
    intrinsic_binop!([] I32x16, BitAnd, bitand, _mm512_and_si512);
    intrinsic_binop!([] I32x16, BitOr, bitor, _mm512_or_si512);
    intrinsic_binop!([] I32x16, BitXor, bitxor, _mm512_xor_si512);

    impl SimdMask for M32x16 {}

    impl BitAnd for M32x16 {
        type Output = Self;

        #[inline(always)]
        fn bitand(self, rhs: Self) -> Self {
            Self(self.0 & rhs.0)
        }
    }

    impl BitOr for M32x16 {
        type Output = Self;

        #[inline(always)]
        fn bitor(self, rhs: Self) -> Self {
            Self(self.0 | rhs.0)
        }
    }

    impl Not for M32x16 {
        type Output = Self;

        #[inline(always)]
        fn not(self) -> Self {
            Self(!self.0)
        }
    }

    impl Neg for F32x16 {
        type Output = Self;

        #[inline(always)]
        fn neg(self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe {
                Self(_mm512_castsi512_ps(_mm512_xor_si512(
                    _mm512_castps_si512(self.0),
                    _mm512_set1_epi32(i32::MIN),
                )))
            }
        }
    }

    impl SimdInt for I32x16 {
        type Mask = M32x16;

        #[inline(always)]
        fn splat(value: i32) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_set1_epi32(value)) }
        }

        #[inline(always)]
        fn shr(self, bits: u32) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_srl_epi32(self.0, _mm_cvtsi32_si128(bits as i32))) }
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> M32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { M32x16(_mm512_cmpeq_epi32_mask(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { M32x16(_mm512_cmpgt_epi32_mask(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn select(mask: M32x16, if_true: Self, if_false: Self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_mask_blend_epi32(mask.0, if_false.0, if_true.0)) }
        }
    }

    impl SimdFloat for F32x16 {
        type Int = I32x16;
        type Mask = M32x16;

        #[inline(always)]
        fn splat(value: f32) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_set1_ps(value)) }
        }

        #[inline(always)]
        fn load(src: &[f32]) -> Self {
            assert!(src.len() >= 16);
            // SAFETY: bounds checked above; unaligned load.
            unsafe { Self(_mm512_loadu_ps(src.as_ptr())) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [f32]) {
            assert!(dst.len() >= 16);
            // SAFETY: bounds checked above; unaligned store.
            unsafe { _mm512_storeu_ps(dst.as_mut_ptr(), self.0) }
        }

        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_min_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_max_ps(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn abs(self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe {
                Self(_mm512_castsi512_ps(_mm512_and_si512(
                    _mm512_castps_si512(self.0),
                    _mm512_set1_epi32(i32::MAX),
                )))
            }
        }

        #[inline(always)]
        fn sqrt(self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_sqrt_ps(self.0)) }
        }

        #[inline(always)]
        fn floor(self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_roundscale_ps::<ROUND_FLOOR>(self.0)) }
        }

        #[inline(always)]
        fn cmp_lt(self, rhs: Self) -> M32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { M32x16(_mm512_cmp_ps_mask::<_CMP_LT_OQ>(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn cmp_gt(self, rhs: Self) -> M32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { M32x16(_mm512_cmp_ps_mask::<_CMP_GT_OQ>(self.0, rhs.0)) }
        }

        #[inline(always)]
        fn to_int(self) -> I32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { I32x16(_mm512_cvttps_epi32(self.0)) }
        }

        #[inline(always)]
        fn from_int(value: I32x16) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_cvtepi32_ps(value.0)) }
        }

        #[inline(always)]
        fn to_bits(self) -> I32x16 {
            // SAFETY: AVX-512F entry points only.
            unsafe { I32x16(_mm512_castps_si512(self.0)) }
        }

        #[inline(always)]
        fn select(mask: M32x16, if_true: Self, if_false: Self) -> Self {
            // SAFETY: AVX-512F entry points only.
            unsafe { Self(_mm512_mask_blend_ps(mask.0, if_false.0, if_true.0)) }
        }
    }
}

#[cfg(feature = "avx512")]
pub(crate) use avx512::{Avx512, Avx512Fma};
