//! Gradient (Perlin) noise on the hypercubic lattice.

use super::hash::{hash, lattice, step};
use super::{grad_dot, lerp, quintic};
use crate::simd::{Backend, SimdFloat};

/// Brings the theoretical peak of each dimensionality close to `1`.
const SCALE: [f32; 5] = [0.0, 0.0, 1.0, 0.9649, 0.6838];

#[inline(always)]
pub(super) fn perlin<S: Backend, const D: usize>(seed: S::I32, point: &[S::F32; 4]) -> S::F32 {
    let (cell, frac) = lattice::<S, D>(point);
    let one = S::F32::splat(1.0);

    let mut corners = [S::F32::splat(0.0); 16];
    for (c, corner) in corners.iter_mut().enumerate().take(1 << D) {
        let mut at = cell;
        let mut offset = frac;
        for axis in 0..D {
            if (c >> axis) & 1 == 1 {
                at[axis] = step::<S>(cell[axis], axis, 1);
                offset[axis] = frac[axis] - one;
            }
        }
        *corner = grad_dot::<S, D>(hash::<S, D>(seed, &at), &offset);
    }

    let mut len = 1 << D;
    for t in frac.iter().take(D) {
        let t = quintic::<S>(*t);
        len >>= 1;
        for c in 0..len {
            corners[c] = lerp::<S>(corners[2 * c], corners[2 * c + 1], t);
        }
    }
    (corners[0] * S::F32::splat(SCALE[D])).clamp(-one, one)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{F32x1, I32x1, Scalar};

    fn perlin_at<const D: usize>(seed: i32, p: [f32; 4]) -> f32 {
        perlin::<Scalar, D>(I32x1(seed), &p.map(F32x1)).0
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_perlin_zero_on_lattice() {
        assert_eq!(perlin_at::<2>(3, [4.0, -2.0, 0.0, 0.0]), 0.0);
        assert_eq!(perlin_at::<3>(3, [4.0, -2.0, 7.0, 0.0]), 0.0);
        assert_eq!(perlin_at::<4>(3, [4.0, -2.0, 7.0, 1.0]), 0.0);
    }

    #[test]
    fn test_perlin_range_and_variation() {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for i in 0..2000 {
            let f = i as f32;
            let p = [f * 0.173, f * 0.071 - 3.0, f * 0.031, f * -0.011];
            for v in [perlin_at::<2>(11, p), perlin_at::<3>(11, p), perlin_at::<4>(11, p)] {
                assert!((-1.0..=1.0).contains(&v));
                min = min.min(v);
                max = max.max(v);
            }
        }
        assert!(max - min > 0.5, "perlin should vary, got [{min}, {max}]");
    }

    #[test]
    fn test_perlin_seed_changes_output() {
        let p = [0.3, 0.6, 0.9, 0.0];
        assert!((perlin_at::<3>(1, p) - perlin_at::<3>(2, p)).abs() > 0.0);
    }
}
