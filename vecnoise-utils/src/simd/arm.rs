//! aarch64 NEON backends.
//!
//! NEON is part of the aarch64 baseline, so the intrinsics are always legal
//! here; `NeonFma` additionally fuses [`Backend::mul_add`] through `fmla`.

use core::arch::aarch64::*;
use core::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};

use super::{Backend, SimdFloat, SimdInt, SimdMask, SimdTier};

macro_rules! neon_binop {
    ($ty:ty, $trait:ident, $method:ident, $intrinsic:ident) => {
        impl $trait for $ty {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                // SAFETY: NEON is mandatory on aarch64.
                unsafe { Self($intrinsic(self.0, rhs.0)) }
            }
        }
    };
}

/// NEON backend (4 lanes), separate multiply and add.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Neon;

/// NEON backend (4 lanes) with fused multiply-add.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct NeonFma;

impl Backend for Neon {
    const LANES: usize = 4;
    const TIER: SimdTier = SimdTier::Neon;
    const FMA: bool = false;

    type F32 = F32x4;
    type I32 = I32x4;
    type Mask = M32x4;

    #[inline(always)]
    fn mul_add(a: F32x4, b: F32x4, c: F32x4) -> F32x4 {
        a * b + c
    }
}

impl Backend for NeonFma {
    const LANES: usize = 4;
    const TIER: SimdTier = SimdTier::Neon;
    const FMA: bool = true;

    type F32 = F32x4;
    type I32 = I32x4;
    type Mask = M32x4;

    #[inline(always)]
    fn mul_add(a: F32x4, b: F32x4, c: F32x4) -> F32x4 {
        // SAFETY: NEON is mandatory on aarch64. `vfmaq_f32(acc, x, y)` is `acc + x * y`.
        unsafe { F32x4(vfmaq_f32(c.0, a.0, b.0)) }
    }
}

#[derive(Copy, Clone)]
#[repr(transparent)]
pub(crate) struct F32x4(float32x4_t);

#[derive(Copy, Clone)]
#[repr(transparent)]
pub(crate) struct I32x4(int32x4_t);

#[derive(Copy, Clone)]
#[repr(transparent)]
pub(crate) struct M32x4(uint32x4_t);

neon_binop!(F32x4, Add, add, vaddq_f32);
neon_binop!(F32x4, Sub, sub, vsubq_f32);
neon_binop!(F32x4, Mul, mul, vmulq_f32);
neon_binop!(F32x4, Div, div, vdivq_f32);
neon_binop!(I32x4, Add, add, vaddq_s32);
neon_binop!(I32x4, Sub, sub, vsubq_s32);
neon_binop!(I32x4, Mul, mul, vmulq_s32);
neon_binop!(I32x4, BitAnd, bitand, vandq_s32);
neon_binop!(I32x4, BitOr, bitor, vorrq_s32);
neon_binop!(I32x4, BitXor, bitxor, veorq_s32);
neon_binop!(M32x4, BitAnd, bitand, vandq_u32);
neon_binop!(M32x4, BitOr, bitor, vorrq_u32);

impl SimdMask for M32x4 {}

impl Not for M32x4 {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vmvnq_u32(self.0)) }
    }
}

impl Neg for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vnegq_f32(self.0)) }
    }
}

impl SimdInt for I32x4 {
    type Mask = M32x4;

    #[inline(always)]
    fn splat(value: i32) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vdupq_n_s32(value)) }
    }

    #[inline(always)]
    fn shr(self, bits: u32) -> Self {
        // `ushl` shifts right for negative counts.
        // SAFETY: NEON is mandatory on aarch64.
        unsafe {
            let shifted = vshlq_u32(vreinterpretq_u32_s32(self.0), vdupq_n_s32(-(bits as i32)));
            Self(vreinterpretq_s32_u32(shifted))
        }
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> M32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { M32x4(vceqq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> M32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { M32x4(vcgtq_s32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn select(mask: M32x4, if_true: Self, if_false: Self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vbslq_s32(mask.0, if_true.0, if_false.0)) }
    }
}

impl SimdFloat for F32x4 {
    type Int = I32x4;
    type Mask = M32x4;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vdupq_n_f32(value)) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        assert!(src.len() >= 4);
        // SAFETY: bounds checked above.
        unsafe { Self(vld1q_f32(src.as_ptr())) }
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        assert!(dst.len() >= 4);
        // SAFETY: bounds checked above.
        unsafe { vst1q_f32(dst.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vminq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vmaxq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vabsq_f32(self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vsqrtq_f32(self.0)) }
    }

    #[inline(always)]
    fn floor(self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vrndmq_f32(self.0)) }
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> M32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { M32x4(vcltq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> M32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { M32x4(vcgtq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn to_int(self) -> I32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe {
            // `vcvtq` saturates; the x86 tiers give `i32::MIN` out of range instead.
            let in_range = vcaltq_f32(self.0, vdupq_n_f32(2_147_483_648.0));
            I32x4(vbslq_s32(in_range, vcvtq_s32_f32(self.0), vdupq_n_s32(i32::MIN)))
        }
    }

    #[inline(always)]
    fn from_int(value: I32x4) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vcvtq_f32_s32(value.0)) }
    }

    #[inline(always)]
    fn to_bits(self) -> I32x4 {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { I32x4(vreinterpretq_s32_f32(self.0)) }
    }

    #[inline(always)]
    fn select(mask: M32x4, if_true: Self, if_false: Self) -> Self {
        // SAFETY: NEON is mandatory on aarch64.
        unsafe { Self(vbslq_f32(mask.0, if_true.0, if_false.0)) }
    }
}
