//! Portable one-lane backend.
//!
//! Also the reference every vector tier is checked against.

use core::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Sub};

use super::{Backend, SimdFloat, SimdInt, SimdMask, SimdTier};

/// Scalar fallback backend.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Scalar;

impl Backend for Scalar {
    const LANES: usize = 1;
    const TIER: SimdTier = SimdTier::Scalar;
    const FMA: bool = false;

    type F32 = F32x1;
    type I32 = I32x1;
    type Mask = bool;

    #[inline(always)]
    fn mul_add(a: F32x1, b: F32x1, c: F32x1) -> F32x1 {
        a * b + c
    }
}

impl SimdMask for bool {}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(transparent)]
pub(crate) struct F32x1(pub(crate) f32);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct I32x1(pub(crate) i32);

macro_rules! scalar_binop {
    ($ty:ident, $trait:ident, $method:ident, $op:expr) => {
        impl $trait for $ty {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self($op(self.0, rhs.0))
            }
        }
    };
}

scalar_binop!(F32x1, Add, add, |a: f32, b: f32| a + b);
scalar_binop!(F32x1, Sub, sub, |a: f32, b: f32| a - b);
scalar_binop!(F32x1, Mul, mul, |a: f32, b: f32| a * b);
scalar_binop!(F32x1, Div, div, |a: f32, b: f32| a / b);

scalar_binop!(I32x1, Add, add, i32::wrapping_add);
scalar_binop!(I32x1, Sub, sub, i32::wrapping_sub);
scalar_binop!(I32x1, Mul, mul, i32::wrapping_mul);
scalar_binop!(I32x1, BitAnd, bitand, |a: i32, b: i32| a & b);
scalar_binop!(I32x1, BitOr, bitor, |a: i32, b: i32| a | b);
scalar_binop!(I32x1, BitXor, bitxor, |a: i32, b: i32| a ^ b);

impl Neg for F32x1 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl SimdInt for I32x1 {
    type Mask = bool;

    #[inline(always)]
    fn splat(value: i32) -> Self {
        Self(value)
    }

    #[inline(always)]
    fn shr(self, bits: u32) -> Self {
        Self(((self.0 as u32) >> bits) as i32)
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> bool {
        self.0 == rhs.0
    }

    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> bool {
        self.0 > rhs.0
    }

    #[inline(always)]
    fn select(mask: bool, if_true: Self, if_false: Self) -> Self {
        if mask { if_true } else { if_false }
    }
}

impl SimdFloat for F32x1 {
    type Int = I32x1;
    type Mask = bool;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self(value)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        Self(src[0])
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[0] = self.0;
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        // Same operand order as `minps`: the second operand wins on equality.
        if self.0 < rhs.0 { self } else { rhs }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        if self.0 > rhs.0 { self } else { rhs }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        Self(self.0.sqrt())
    }

    #[inline(always)]
    fn floor(self) -> Self {
        Self(self.0.floor())
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> bool {
        self.0 < rhs.0
    }

    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> bool {
        self.0 > rhs.0
    }

    #[inline(always)]
    fn to_int(self) -> I32x1 {
        // Match the vector conversions, which yield `i32::MIN` when out of range.
        if (-2_147_483_648.0..2_147_483_648.0).contains(&self.0) {
            I32x1(self.0 as i32)
        } else {
            I32x1(i32::MIN)
        }
    }

    #[inline(always)]
    fn from_int(value: I32x1) -> Self {
        Self(value.0 as f32)
    }

    #[inline(always)]
    fn to_bits(self) -> I32x1 {
        I32x1(self.0.to_bits() as i32)
    }

    #[inline(always)]
    fn select(mask: bool, if_true: Self, if_false: Self) -> Self {
        if mask { if_true } else { if_false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ops_wrap() {
        let big = I32x1::splat(i32::MAX);
        assert_eq!((big + I32x1::splat(1)).0, i32::MIN);
        assert_eq!((big * I32x1::splat(2)).0, -2);
        assert_eq!(I32x1::splat(-1).shr(28).0, 0xF);
    }

    #[test]
    fn test_floor_negative() {
        assert_eq!(F32x1::splat(-0.5).floor().0, -1.0);
        assert_eq!(F32x1::splat(2.0).floor().0, 2.0);
    }

    #[test]
    fn test_to_int_out_of_range() {
        assert_eq!(F32x1::splat(-2.7).to_int().0, -2);
        assert_eq!(F32x1::splat(-2_147_483_648.0).to_int().0, i32::MIN);
        assert_eq!(F32x1::splat(3.0e9).to_int().0, i32::MIN);
        assert_eq!(F32x1::splat(-3.0e9).to_int().0, i32::MIN);
        assert_eq!(F32x1::splat(f32::NAN).to_int().0, i32::MIN);
        assert_eq!(F32x1::splat(f32::INFINITY).to_int().0, i32::MIN);
    }

    #[test]
    fn test_mul_add_is_unfused() {
        let a = F32x1::splat(0.1);
        let r = Scalar::mul_add(a, a, F32x1::splat(1.0));
        assert_eq!(r.0.to_bits(), (0.1f32 * 0.1 + 1.0).to_bits());
    }
}
