//! Integer lattice hashing.
//!
//! Lattice coordinates are kept premultiplied by their axis prime, so stepping
//! to a neighbouring cell is one addition of [`PRIMES`]`[axis]`.

use crate::simd::{Backend, SimdFloat, SimdInt};

/// Per-axis multipliers for `x, y, z, w`.
pub(super) const PRIMES: [i32; 4] = [1619, 31337, 6971, 1013];

const HASH_MULTIPLIER: i32 = 60493;
const REHASH_MULTIPLIER: i32 = 0x27d4_eb2d;
/// Maps the full `i32` range onto `[-1, 1]`.
const INT_TO_UNIT: f32 = 1.0 / 2_147_483_648.0;

/// Hashes premultiplied lattice coordinates with a seed.
#[inline(always)]
pub(super) fn hash<S: Backend, const D: usize>(seed: S::I32, cell: &[S::I32; 4]) -> S::I32 {
    let mut h = seed;
    for axis in cell.iter().take(D) {
        h = h ^ *axis;
    }
    h = h * h * S::I32::splat(HASH_MULTIPLIER) * h;
    h ^ h.shr(13)
}

/// Further scrambles a hash, for drawing a second independent value.
#[inline(always)]
pub(super) fn rehash<S: Backend>(h: S::I32) -> S::I32 {
    let h = h * S::I32::splat(REHASH_MULTIPLIER);
    h ^ h.shr(15)
}

/// Hash to a float in `[-1, 1]`.
#[inline(always)]
pub(super) fn to_unit<S: Backend>(h: S::I32) -> S::F32 {
    S::F32::from_int(h) * S::F32::splat(INT_TO_UNIT)
}

/// Floors every axis, returning premultiplied lattice coordinates and the
/// fractional offsets inside the cell.
#[inline(always)]
pub(super) fn lattice<S: Backend, const D: usize>(point: &[S::F32; 4]) -> ([S::I32; 4], [S::F32; 4]) {
    let mut cell = [S::I32::splat(0); 4];
    let mut frac = [S::F32::splat(0.0); 4];
    for axis in 0..D {
        let floor = point[axis].floor();
        cell[axis] = floor.to_int() * S::I32::splat(PRIMES[axis]);
        frac[axis] = point[axis] - floor;
    }
    (cell, frac)
}

/// `cell` moved by `offset` cells along `axis`.
#[inline(always)]
pub(super) fn step<S: Backend>(cell: S::I32, axis: usize, offset: i32) -> S::I32 {
    cell + S::I32::splat(PRIMES[axis].wrapping_mul(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{F32x1, I32x1, Scalar};

    fn hash2(seed: i32, x: i32, y: i32) -> i32 {
        let cell = [I32x1(x * PRIMES[0]), I32x1(y * PRIMES[1]), I32x1(0), I32x1(0)];
        hash::<Scalar, 2>(I32x1(seed), &cell).0
    }

    #[test]
    fn test_hash_is_deterministic_and_seeded() {
        assert_eq!(hash2(42, 3, 4), hash2(42, 3, 4));
        assert_ne!(hash2(42, 3, 4), hash2(43, 3, 4));
        assert_ne!(hash2(42, 3, 4), hash2(42, 4, 3));
    }

    #[test]
    fn test_hash_ignores_unused_axes() {
        let mut cell = [I32x1(5), I32x1(6), I32x1(0), I32x1(0)];
        let a = hash::<Scalar, 2>(I32x1(1), &cell).0;
        cell[2] = I32x1(999);
        assert_eq!(hash::<Scalar, 2>(I32x1(1), &cell).0, a);
        assert_ne!(hash::<Scalar, 3>(I32x1(1), &cell).0, a);
    }

    #[test]
    fn test_to_unit_range() {
        for h in [i32::MIN, -1, 0, 1, i32::MAX] {
            let v = to_unit::<Scalar>(I32x1(h)).0;
            assert!((-1.0..=1.0).contains(&v), "{h} -> {v}");
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_lattice_negative_coordinates() {
        let point = [F32x1(-0.25), F32x1(1.5), F32x1(0.0), F32x1(0.0)];
        let (cell, frac) = lattice::<Scalar, 2>(&point);
        assert_eq!(cell[0].0, -PRIMES[0]);
        assert_eq!(cell[1].0, PRIMES[1]);
        assert_eq!(frac[0].0, 0.75);
        assert_eq!(frac[1].0, 0.5);
        assert_eq!(step::<Scalar>(cell[0], 0, 1).0, 0);
    }
}
