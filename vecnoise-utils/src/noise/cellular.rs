//! Cellular (Worley) noise.
//!
//! Every lattice cell owns one feature point, displaced from the cell centre by
//! hash bits scaled with the jitter. The `3^D` cells around the sample are
//! searched for the nearest and second nearest point.

use super::hash::{hash, lattice, rehash, step, to_unit};
use super::{CellularDistance, CellularParams, CellularReturnType};
use crate::simd::{Backend, SimdFloat, SimdInt};

/// Ten hash bits per axis.
const JITTER_BITS: i32 = 1023;
const JITTER_RANGE: f32 = 1023.0;
const JITTER_CENTER: f32 = 511.5;

#[inline(always)]
pub(super) fn cellular<S: Backend, const D: usize>(
    params: &CellularParams,
    seed: S::I32,
    point: &[S::F32; 4],
) -> S::F32 {
    let (cell, frac) = lattice::<S, D>(point);
    let zero = S::F32::splat(0.0);
    let half = S::F32::splat(0.5);
    let jitter = S::F32::splat(params.jitter / JITTER_RANGE);
    let center = S::F32::splat(JITTER_CENTER);
    let bits = S::I32::splat(JITTER_BITS);

    let mut nearest = S::F32::splat(f32::MAX);
    let mut second = S::F32::splat(f32::MAX);
    let mut nearest_hash = S::I32::splat(0);

    let neighbours = 3usize.pow(D as u32);
    for n in 0..neighbours {
        let mut at = cell;
        let mut d = [zero; 4];
        let mut rest = n;
        for axis in 0..D {
            let offset = (rest % 3) as i32 - 1;
            rest /= 3;
            at[axis] = step::<S>(cell[axis], axis, offset);
            d[axis] = S::F32::splat(offset as f32) + half - frac[axis];
        }

        let h = hash::<S, D>(seed, &at);
        for (axis, delta) in d.iter_mut().enumerate().take(D) {
            let raw = if axis < 3 {
                h.shr(10 * axis as u32)
            } else {
                rehash::<S>(h)
            };
            let spread = S::F32::from_int(raw & bits) - center;
            *delta = S::mul_add(spread, jitter, *delta);
        }

        let dist = distance::<S, D>(params.distance, &d);
        second = second.min(dist).max(nearest);
        let closer = dist.cmp_lt(nearest);
        nearest_hash = S::I32::select(closer, h, nearest_hash);
        nearest = nearest.min(dist);
    }

    if params.distance == CellularDistance::Euclidean {
        nearest = nearest.sqrt();
        second = second.sqrt();
    }

    match params.return_type {
        CellularReturnType::CellValue => to_unit::<S>(rehash::<S>(nearest_hash)),
        CellularReturnType::Distance => nearest,
        CellularReturnType::Distance2 => second,
        CellularReturnType::Distance2Add => (nearest + second) * half,
        CellularReturnType::Distance2Sub => second - nearest,
        CellularReturnType::Distance2Mul => nearest * second * half,
        CellularReturnType::Distance2Div => nearest / second,
    }
}

/// Distance for the search. Euclidean stays squared until the end.
#[inline(always)]
fn distance<S: Backend, const D: usize>(metric: CellularDistance, d: &[S::F32; 4]) -> S::F32 {
    let mut squared = S::F32::splat(0.0);
    let mut manhattan = S::F32::splat(0.0);
    for delta in d.iter().take(D) {
        squared = S::mul_add(*delta, *delta, squared);
        manhattan = manhattan + delta.abs();
    }
    match metric {
        CellularDistance::Euclidean => squared,
        CellularDistance::Manhattan => manhattan,
        CellularDistance::Natural => squared + manhattan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::{F32x1, I32x1, Scalar};

    fn params(distance: CellularDistance, return_type: CellularReturnType, jitter: f32) -> CellularParams {
        CellularParams {
            distance,
            return_type,
            jitter,
        }
    }

    fn cellular_at<const D: usize>(params: &CellularParams, p: [f32; 4]) -> f32 {
        cellular::<Scalar, D>(params, I32x1(1337), &p.map(F32x1)).0
    }

    #[test]
    fn test_zero_jitter_is_cell_centres() {
        let p = params(CellularDistance::Euclidean, CellularReturnType::Distance, 0.0);
        // At a cell centre the nearest point is the centre itself.
        let at_centre = cellular_at::<2>(&p, [3.5, -4.5, 0.0, 0.0]);
        assert!(at_centre.abs() < 1e-6, "{at_centre}");
        // On a cell corner all four neighbouring centres are equidistant.
        let p2 = params(CellularDistance::Euclidean, CellularReturnType::Distance2Sub, 0.0);
        let on_corner = cellular_at::<2>(&p2, [3.0, 3.0, 0.0, 0.0]);
        assert!(on_corner.abs() < 1e-6, "{on_corner}");
    }

    #[test]
    fn test_second_nearest_not_closer() {
        let near = params(CellularDistance::Natural, CellularReturnType::Distance, 1.0);
        let far = params(CellularDistance::Natural, CellularReturnType::Distance2, 1.0);
        for i in 0..300 {
            let f = i as f32;
            let pt = [f * 0.37, f * 0.11, f * -0.23, 0.0];
            assert!(cellular_at::<3>(&near, pt) <= cellular_at::<3>(&far, pt));
        }
    }

    #[test]
    fn test_return_types_bounded() {
        let types = [
            CellularReturnType::CellValue,
            CellularReturnType::Distance,
            CellularReturnType::Distance2Add,
            CellularReturnType::Distance2Div,
        ];
        for return_type in types {
            let p = params(CellularDistance::Euclidean, return_type, 1.0);
            for i in 0..200 {
                let f = i as f32;
                let v = cellular_at::<4>(&p, [f * 0.29, f * 0.13, f * 0.41, f * -0.07]);
                assert!(v.is_finite());
                assert!((-1.0..=1.5).contains(&v), "{return_type:?} gave {v}");
            }
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_cell_value_constant_inside_cell() {
        let p = params(CellularDistance::Euclidean, CellularReturnType::CellValue, 0.0);
        // With centred points the owning cell is the one containing the sample.
        let a = cellular_at::<2>(&p, [5.1, 5.1, 0.0, 0.0]);
        let b = cellular_at::<2>(&p, [5.9, 5.8, 0.0, 0.0]);
        assert_eq!(a, b);
    }
}
