//! Per-tier kernel entry points.
//!
//! Each function evaluates one [`CoordBatch`] into a [`Lanes`] result with the
//! noise algorithms instantiated for one backend. The vector tiers are
//! `unsafe` because they are compiled with `#[target_feature]`: calling one on a
//! CPU without those features is undefined behavior. `vecnoise-core` only calls
//! them after detection has confirmed the features.

use crate::batch::{CoordBatch, Dims, Lanes};
use crate::noise::{NoiseParams, sample};
use crate::simd::scalar::Scalar;
use crate::simd::{Backend, MAX_LANES, SimdFloat};

#[inline(always)]
fn evaluate_batch<S: Backend>(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    match batch.dims {
        Dims::Two => evaluate_dims::<S, 2>(batch, params, out),
        Dims::Three => evaluate_dims::<S, 3>(batch, params, out),
        Dims::Four => evaluate_dims::<S, 4>(batch, params, out),
    }
}

#[inline(always)]
fn evaluate_dims<S: Backend, const D: usize>(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    for start in (0..MAX_LANES).step_by(S::LANES) {
        let point = [
            S::F32::load(&batch.axes[0].0[start..]),
            S::F32::load(&batch.axes[1].0[start..]),
            S::F32::load(&batch.axes[2].0[start..]),
            S::F32::load(&batch.axes[3].0[start..]),
        ];
        sample::<S, D>(params, point).store(&mut out.0[start..]);
    }
}

/// Portable scalar kernel, valid on every CPU.
pub fn evaluate_scalar(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<Scalar>(batch, params, out);
}

/// SSE2 kernel.
///
/// # Safety
/// The CPU must support SSE2.
#[cfg(all(target_arch = "x86_64", feature = "sse2"))]
#[target_feature(enable = "sse2")]
pub unsafe fn evaluate_sse2(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Sse2>(batch, params, out);
}

/// SSE4.1 kernel.
///
/// # Safety
/// The CPU must support SSE4.1.
#[cfg(all(target_arch = "x86_64", feature = "sse41"))]
#[target_feature(enable = "sse4.1")]
pub unsafe fn evaluate_sse41(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Sse41>(batch, params, out);
}

/// AVX2 kernel with separate multiply and add.
///
/// # Safety
/// The CPU must support AVX2.
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
#[target_feature(enable = "avx2")]
pub unsafe fn evaluate_avx2(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Avx2>(batch, params, out);
}

/// AVX2 kernel with fused multiply-add.
///
/// # Safety
/// The CPU must support AVX2 and FMA.
#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
#[target_feature(enable = "avx2,fma")]
pub unsafe fn evaluate_avx2_fma(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Avx2Fma>(batch, params, out);
}

/// AVX-512F kernel with separate multiply and add.
///
/// # Safety
/// The CPU must support AVX-512F.
#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
#[target_feature(enable = "avx512f")]
pub unsafe fn evaluate_avx512(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Avx512>(batch, params, out);
}

/// AVX-512F kernel with fused multiply-add.
///
/// # Safety
/// The CPU must support AVX-512F and FMA.
#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
#[target_feature(enable = "avx512f,fma")]
pub unsafe fn evaluate_avx512_fma(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::x86::Avx512Fma>(batch, params, out);
}

/// NEON kernel with separate multiply and add.
///
/// # Safety
/// The CPU must support NEON.
#[cfg(all(target_arch = "aarch64", feature = "neon"))]
#[target_feature(enable = "neon")]
pub unsafe fn evaluate_neon(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::arm::Neon>(batch, params, out);
}

/// NEON kernel with fused multiply-add.
///
/// # Safety
/// The CPU must support NEON.
#[cfg(all(target_arch = "aarch64", feature = "neon"))]
#[target_feature(enable = "neon")]
pub unsafe fn evaluate_neon_fma(batch: &CoordBatch, params: &NoiseParams, out: &mut Lanes) {
    evaluate_batch::<crate::simd::arm::NeonFma>(batch, params, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{
        CellularDistance, CellularParams, CellularReturnType, FractalType, NoiseType, PerturbParams,
        PerturbType,
    };

    fn params(noise: NoiseType) -> NoiseParams {
        NoiseParams {
            noise,
            fractal: FractalType::Fbm,
            seed: 1337,
            frequency: 0.05,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            bounding: NoiseParams::fractal_bounding(0.5, 3),
            cellular: CellularParams {
                distance: CellularDistance::Euclidean,
                return_type: CellularReturnType::Distance,
                jitter: 1.0,
            },
            perturb: PerturbParams {
                // White noise hashes raw coordinate bits, so a warp rounded
                // differently by FMA tiers would change every value.
                kind: if noise == NoiseType::White {
                    PerturbType::None
                } else {
                    PerturbType::GradientNormalise
                },
                amplitude: 1.0,
                frequency: 0.5,
                octaves: 3,
                lacunarity: 2.0,
                gain: 0.5,
                normalise_length: 50.0,
            },
        }
    }

    fn batch(dims: Dims) -> CoordBatch {
        let mut batch = CoordBatch::new(dims);
        for lane in 0..MAX_LANES {
            let f = lane as f32;
            batch.set_point(lane, &[f * 3.1 - 20.0, f * -1.7 + 4.0, f * 0.9, f * 2.3]);
        }
        batch
    }

    fn scalar(noise: NoiseType, dims: Dims) -> Lanes {
        let mut out = Lanes::ZERO;
        evaluate_scalar(&batch(dims), &params(noise), &mut out);
        out
    }

    #[test]
    fn test_scalar_lanes_match_single_points() {
        for noise in NoiseType::ALL {
            let full = scalar(noise, Dims::Three);
            let source = batch(Dims::Three);
            for lane in [0, 7, 15] {
                let point: Vec<f32> = source.axes[..3].iter().map(|a| a.0[lane]).collect();
                let Some(single) = CoordBatch::from_point(&point) else {
                    panic!("three components");
                };
                let mut out = Lanes::ZERO;
                evaluate_scalar(&single, &params(noise), &mut out);
                assert_eq!(out.0[0].to_bits(), full.0[lane].to_bits(), "{noise:?} lane {lane}");
            }
        }
    }

    #[cfg(all(target_arch = "x86_64", feature = "sse2", feature = "sse41", feature = "avx2"))]
    #[test]
    fn test_x86_tiers_agree_with_scalar() {
        use std::arch::is_x86_feature_detected;

        type Kernel = unsafe fn(&CoordBatch, &NoiseParams, &mut Lanes);
        let fma = is_x86_feature_detected!("fma");
        let mut tiers: Vec<(&str, Kernel)> = vec![("sse2", evaluate_sse2 as Kernel)];
        if is_x86_feature_detected!("sse4.1") {
            tiers.push(("sse41", evaluate_sse41 as Kernel));
        }
        if is_x86_feature_detected!("avx2") {
            tiers.push(("avx2", evaluate_avx2 as Kernel));
            if fma {
                tiers.push(("avx2_fma", evaluate_avx2_fma as Kernel));
            }
        }
        #[cfg(feature = "avx512")]
        if is_x86_feature_detected!("avx512f") {
            tiers.push(("avx512", evaluate_avx512 as Kernel));
            if fma {
                tiers.push(("avx512_fma", evaluate_avx512_fma as Kernel));
            }
        }

        for noise in NoiseType::ALL {
            for dims in [Dims::Two, Dims::Three, Dims::Four] {
                let expected = scalar(noise, dims);
                for (name, kernel) in &tiers {
                    let mut out = Lanes::ZERO;
                    // SAFETY: each kernel was added only after its features were detected.
                    unsafe { kernel(&batch(dims), &params(noise), &mut out) };
                    for lane in 0..MAX_LANES {
                        let (a, b) = (expected.0[lane], out.0[lane]);
                        assert!((a - b).abs() <= 1e-4, "{name} {noise:?} {dims:?} lane {lane}: {a} vs {b}");
                    }
                }
            }
        }
    }
}
