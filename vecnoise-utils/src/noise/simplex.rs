//! Simplex noise in 2, 3 and 4 dimensions.
//!
//! The lattice is skewed so that each unit hypercube splits into `D!` simplices;
//! the simplex containing a point is found by ranking its offset coordinates,
//! which works for any dimension without the per-dimension lookup tables of the
//! classic formulation.

use super::grad_dot;
use super::hash::{hash, lattice, step};
use crate::simd::{Backend, SimdFloat, SimdInt};

/// Skewing factor `(sqrt(D + 1) - 1) / D`, indexed by dimension.
const SKEW: [f32; 5] = [0.0, 0.0, 0.366_025_42, 1.0 / 3.0, 0.309_017];
/// Unskewing factor `(1 - 1 / sqrt(D + 1)) / D`, indexed by dimension.
const UNSKEW: [f32; 5] = [0.0, 0.0, 0.211_324_87, 1.0 / 6.0, 0.138_196_6];
/// Squared radius of each corner's kernel.
const FALLOFF: [f32; 5] = [0.0, 0.0, 0.5, 0.6, 0.6];
/// Output scale bringing the peak close to `1`.
const SCALE: [f32; 5] = [0.0, 0.0, 70.0, 32.0, 27.0];

#[inline(always)]
pub(super) fn simplex<S: Backend, const D: usize>(seed: S::I32, point: &[S::F32; 4]) -> S::F32 {
    let zero = S::F32::splat(0.0);
    let one = S::F32::splat(1.0);

    // Skew into simplex space and find the containing hypercube.
    let mut sum = zero;
    for axis in point.iter().take(D) {
        sum = sum + *axis;
    }
    let skew = sum * S::F32::splat(SKEW[D]);
    let mut skewed = [zero; 4];
    for axis in 0..D {
        skewed[axis] = point[axis] + skew;
    }
    let (cell, _) = lattice::<S, D>(&skewed);

    // Offset from the hypercube origin, back in unskewed space.
    let mut base = [zero; 4];
    let mut cell_sum = zero;
    for axis in 0..D {
        base[axis] = skewed[axis].floor();
        cell_sum = cell_sum + base[axis];
    }
    let unskew = cell_sum * S::F32::splat(UNSKEW[D]);
    let mut x0 = [zero; 4];
    for axis in 0..D {
        x0[axis] = point[axis] - (base[axis] - unskew);
    }

    // Rank each axis by magnitude; ties go to the lower axis.
    let i_zero = S::I32::splat(0);
    let i_one = S::I32::splat(1);
    let mut rank = [i_zero; 4];
    for a in 0..D {
        for b in (a + 1)..D {
            let b_larger = x0[a].cmp_lt(x0[b]);
            rank[b] = rank[b] + S::I32::select(b_larger, i_one, i_zero);
            rank[a] = rank[a] + S::I32::select(b_larger, i_zero, i_one);
        }
    }

    let falloff = S::F32::splat(FALLOFF[D]);
    let mut total = zero;
    for vertex in 0..=D {
        // Vertex `k` has moved one step along the `k` highest-ranked axes.
        let threshold = S::I32::splat((D - vertex) as i32);
        let unskew = S::F32::splat(vertex as f32 * UNSKEW[D]);
        let mut at = cell;
        let mut d = [zero; 4];
        let mut dist = zero;
        for axis in 0..D {
            let moved = rank[axis].cmp_gt(threshold - i_one);
            let shift = S::F32::select(moved, one, zero);
            at[axis] = S::I32::select(moved, step::<S>(cell[axis], axis, 1), cell[axis]);
            d[axis] = x0[axis] - shift + unskew;
            dist = S::mul_add(d[axis], d[axis], dist);
        }

        let t = (falloff - dist).max(zero);
        let t2 = t * t;
        total = S::mul_add(t2 * t2, grad_dot::<S, D>(hash::<S, D>(seed, &at), &d), total);
    }

    (total * S::F32::splat(SCALE[D])).clamp(-one, one)
}
