//! Value noise: hashed corner values blended with the quintic curve.

use super::hash::{hash, lattice, step, to_unit};
use super::{lerp, quintic};
use crate::simd::{Backend, SimdFloat};

#[inline(always)]
pub(super) fn value<S: Backend, const D: usize>(seed: S::I32, point: &[S::F32; 4]) -> S::F32 {
    let (cell, frac) = lattice::<S, D>(point);

    // Corner `c` takes the upper cell along every axis whose bit is set in `c`.
    let mut corners = [S::F32::splat(0.0); 16];
    for (c, corner) in corners.iter_mut().enumerate().take(1 << D) {
        let mut at = cell;
        for axis in 0..D {
            if (c >> axis) & 1 == 1 {
                at[axis] = step::<S>(cell[axis], axis, 1);
            }
        }
        *corner = to_unit::<S>(hash::<S, D>(seed, &at));
    }

    let mut len = 1 << D;
    for t in frac.iter().take(D) {
        let t = quintic::<S>(*t);
        len >>= 1;
        for c in 0..len {
            corners[c] = lerp::<S>(corners[2 * c], corners[2 * c + 1], t);
        }
    }
    corners[0]
}
