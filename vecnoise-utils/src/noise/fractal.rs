//! Octave combination.
//!
//! Octave `i` samples the base noise at `point * lacunarity^i` with seed
//! `seed + i` and weight `gain^i`; the sum is normalised by
//! [`NoiseParams::bounding`].

use super::{FractalType, NoiseParams, base};
use crate::simd::{Backend, SimdFloat};

#[inline(always)]
pub(super) fn combine<S: Backend, const D: usize>(params: &NoiseParams, point: &[S::F32; 4]) -> S::F32 {
    let zero = S::F32::splat(0.0);
    let one = S::F32::splat(1.0);
    let two = S::F32::splat(2.0);

    let octaves = match params.fractal {
        FractalType::None => 1,
        _ => params.octaves.max(1),
    };
    let lacunarity = S::F32::splat(params.lacunarity);

    let mut p = *point;
    let mut sum = zero;
    let mut amplitude = 1.0f32;
    let mut weight = one;
    for octave in 0..octaves {
        let n = base::<S, D>(params, params.seed.wrapping_add(octave as i32), &p);
        let amp = S::F32::splat(amplitude);
        sum = match params.fractal {
            FractalType::None => n,
            FractalType::Fbm => S::mul_add(n, amp, sum),
            FractalType::Billow => S::mul_add(S::mul_add(n.abs(), two, -one), amp, sum),
            FractalType::RigidMulti => {
                let ridge = one - n.abs();
                let signal = ridge * ridge * weight;
                weight = (signal * two).clamp(zero, one);
                S::mul_add(signal, amp, sum)
            }
        };

        for axis in p.iter_mut().take(D) {
            *axis = *axis * lacunarity;
        }
        amplitude *= params.gain;
    }

    match params.fractal {
        FractalType::None => sum,
        FractalType::Fbm | FractalType::Billow => sum * S::F32::splat(params.bounding),
        FractalType::RigidMulti => S::mul_add(sum, S::F32::splat(params.bounding * 2.0), -one),
    }
}
