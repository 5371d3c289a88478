//! Coordinate perturbation (domain warp).

use super::perlin::perlin;
use super::{NoiseParams, PerturbParams};
use crate::simd::{Backend, SimdFloat, SimdInt};

/// Added to the seed for each axis so the offsets are uncorrelated.
const AXIS_SEEDS: [i32; 4] = [0x1b87_3593, 0x4cf5_ad43, 0x68e3_1da4, 0x2d9f_a7c1];

/// Warps `point` in place according to `perturb`.
#[inline(always)]
pub(super) fn apply<S: Backend, const D: usize>(perturb: &PerturbParams, seed: i32, point: &mut [S::F32; 4]) {
    let zero = S::F32::splat(0.0);

    let octaves = perturb.kind.gradient_octaves(perturb.octaves);
    if octaves > 0 {
        let mut frequency = perturb.frequency;
        let mut amplitude = perturb.amplitude * NoiseParams::fractal_bounding(perturb.gain, octaves);
        let mut offset = [zero; 4];
        for octave in 0..octaves {
            let mut q = [zero; 4];
            for axis in 0..D {
                q[axis] = point[axis] * S::F32::splat(frequency);
            }
            let octave_seed = seed.wrapping_add(octave as i32);
            for axis in 0..D {
                let axis_seed = S::I32::splat(octave_seed.wrapping_add(AXIS_SEEDS[axis]));
                let n = perlin::<S, D>(axis_seed, &q);
                offset[axis] = S::mul_add(n, S::F32::splat(amplitude), offset[axis]);
            }
            frequency *= perturb.lacunarity;
            amplitude *= perturb.gain;
        }
        for axis in 0..D {
            point[axis] = point[axis] + offset[axis];
        }
    }

    if perturb.kind.normalises() {
        let mut length = zero;
        for axis in point.iter().take(D) {
            length = S::mul_add(*axis, *axis, length);
        }
        let length = length.sqrt();
        // Points at the origin have no direction and are left in place.
        let nonzero = length.cmp_gt(zero);
        let scale = S::F32::splat(perturb.normalise_length) / length;
        for axis in point.iter_mut().take(D) {
            *axis = S::F32::select(nonzero, *axis * scale, *axis);
        }
    }
}
