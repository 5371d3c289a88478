//! Cubic value noise over the `4^D` surrounding lattice values.

use super::hash::{hash, lattice, step, to_unit};
use crate::simd::{Backend, SimdFloat};

/// `1 / 1.5^D`, the peak of the cubic blend, indexed by dimension.
const BOUNDING: [f32; 5] = [1.0, 1.0, 1.0 / 2.25, 1.0 / 3.375, 1.0 / 5.0625];

#[inline(always)]
pub(super) fn cubic<S: Backend, const D: usize>(seed: S::I32, point: &[S::F32; 4]) -> S::F32 {
    let (cell, frac) = lattice::<S, D>(point);

    // Index `c` holds the point at offset `digit_a(c) - 1` along each axis `a`,
    // reading `c` in base four with axis 0 as the lowest digit.
    let mut values = [S::F32::splat(0.0); 256];
    for (c, value) in values.iter_mut().enumerate().take(1 << (2 * D)) {
        let mut at = cell;
        for axis in 0..D {
            let offset = ((c >> (2 * axis)) & 3) as i32 - 1;
            at[axis] = step::<S>(cell[axis], axis, offset);
        }
        *value = to_unit::<S>(hash::<S, D>(seed, &at));
    }

    let mut len = 1 << (2 * D);
    for t in frac.iter().take(D) {
        len >>= 2;
        for c in 0..len {
            values[c] = cubic_lerp::<S>(
                values[4 * c],
                values[4 * c + 1],
                values[4 * c + 2],
                values[4 * c + 3],
                *t,
            );
        }
    }
    values[0] * S::F32::splat(BOUNDING[D])
}

/// Cubic through `b` (at `t = 0`) and `c` (at `t = 1`) shaped by `a` and `d`.
#[inline(always)]
fn cubic_lerp<S: Backend>(a: S::F32, b: S::F32, c: S::F32, d: S::F32, t: S::F32) -> S::F32 {
    let p = (d - c) - (a - b);
    let q = (a - b) - p;
    let r = c - a;
    S::mul_add(S::mul_add(S::mul_add(p, t, q), t, r), t, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{F32x1, I32x1, Scalar};

    fn cubic_at<const D: usize>(seed: i32, p: [f32; 4]) -> f32 {
        cubic::<Scalar, D>(I32x1(seed), &p.map(F32x1)).0
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_cubic_lerp_endpoints() {
        let f = F32x1;
        let at = |t| cubic_lerp::<Scalar>(f(0.3), f(-0.5), f(0.9), f(0.1), f(t)).0;
        assert_eq!(at(0.0), -0.5);
        assert!((at(1.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_cubic_range() {
        for i in 0..400 {
            let f = i as f32;
            let p = [f * 0.23, f * -0.31, f * 0.17, f * 0.05];
            for v in [cubic_at::<2>(3, p), cubic_at::<3>(3, p), cubic_at::<4>(3, p)] {
                assert!((-1.0..=1.0).contains(&v), "{v}");
            }
        }
    }

    #[test]
    fn test_cubic_is_continuous() {
        let a = cubic_at::<2>(8, [2.999_99, 0.4, 0.0, 0.0]);
        let b = cubic_at::<2>(8, [3.000_01, 0.4, 0.0, 0.0]);
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}
