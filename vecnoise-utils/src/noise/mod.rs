//! Noise algorithms, written once against the SIMD [`Backend`] traits.
//!
//! This module provides the noise generation primitives evaluated by every kernel:
//!
//! - [`NoiseType::Value`] - hashed lattice values, quintic interpolation
//! - [`NoiseType::Perlin`] - gradient noise on the hypercubic lattice
//! - [`NoiseType::Simplex`] - gradient noise on the simplex lattice
//! - [`NoiseType::Cellular`] - Worley noise over jittered feature points
//! - [`NoiseType::White`] - hashed coordinate bits
//! - [`NoiseType::Cubic`] - hashed lattice values, cubic interpolation
//!
//! combined through the [`FractalType`] octave sums and optionally warped by a
//! [`PerturbType`] first.
//!
//! Points are passed as `[S::F32; 4]` with a const dimension `D`; axes at or
//! beyond `D` are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simd::{Backend, SimdFloat, SimdInt};

mod cellular;
mod cubic;
mod fractal;
mod hash;
mod perlin;
mod perturb;
mod simplex;
mod value;
mod white;

/// Gradient vectors of 3D improved noise, indexed by the low four hash bits.
///
/// [`grad3`] computes the same table without a lookup.
#[cfg(test)]
pub(crate) const GRADIENT: [[i32; 3]; 16] = [
    [1, 1, 0],
    [-1, 1, 0],
    [1, -1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, 1],
    [1, 0, -1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, 1],
    [0, 1, -1],
    [0, -1, -1],
    [1, 1, 0],
    [0, -1, 1],
    [-1, 1, 0],
    [0, -1, -1],
];

/// Error converting an integer code into one of the configuration enums.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown {kind} value {value}")]
pub struct UnknownVariant {
    /// Name of the enum being decoded.
    pub kind: &'static str,
    /// The rejected code.
    pub value: i32,
}

/// Generates the integer-code conversion for a fieldless configuration enum.
macro_rules! int_coded {
    ($ty:ident, $kind:literal, [$($variant:ident = $code:literal),+ $(,)?]) => {
        impl TryFrom<i32> for $ty {
            type Error = UnknownVariant;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant { kind: $kind, value }),
                }
            }
        }

        impl From<$ty> for i32 {
            fn from(value: $ty) -> Self {
                match value {
                    $($ty::$variant => $code,)+
                }
            }
        }
    };
}

/// Base noise algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    /// Hashed lattice values, quintic interpolation.
    Value,
    /// Gradient noise on the hypercubic lattice.
    Perlin,
    /// Gradient noise on the simplex lattice.
    Simplex,
    /// Distance to jittered feature points.
    Cellular,
    /// Uncorrelated per-coordinate values.
    White,
    /// Hashed lattice values, cubic interpolation.
    Cubic,
}

impl NoiseType {
    /// Every algorithm, in code order.
    pub const ALL: [Self; 6] = [
        Self::Value,
        Self::Perlin,
        Self::Simplex,
        Self::Cellular,
        Self::White,
        Self::Cubic,
    ];
}

int_coded!(NoiseType, "noise type", [Value = 0, Perlin = 1, Simplex = 2, Cellular = 3, White = 4, Cubic = 5]);

/// How octaves are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalType {
    /// A single octave.
    None,
    /// Fractional Brownian motion: plain weighted sum.
    #[default]
    Fbm,
    /// Sum of folded octaves, `2|n| - 1`.
    Billow,
    /// Sum of ridged octaves with feedback weighting.
    RigidMulti,
}

int_coded!(FractalType, "fractal type", [None = 0, Fbm = 1, Billow = 2, RigidMulti = 3]);

/// Distance metric of the cellular search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellularDistance {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Sum of absolute axis offsets.
    Manhattan,
    /// Squared Euclidean plus Manhattan.
    Natural,
}

int_coded!(CellularDistance, "cellular distance", [Euclidean = 0, Manhattan = 1, Natural = 2]);

/// What the cellular search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellularReturnType {
    /// Hashed value of the nearest feature point's cell.
    CellValue,
    /// Distance to the nearest point.
    #[default]
    Distance,
    /// Distance to the second nearest point.
    Distance2,
    /// Mean of the two nearest distances.
    Distance2Add,
    /// Second nearest minus nearest.
    Distance2Sub,
    /// Half the product of the two nearest distances.
    Distance2Mul,
    /// Nearest over second nearest.
    Distance2Div,
}

int_coded!(CellularReturnType, "cellular return type", [
    CellValue = 0,
    Distance = 1,
    Distance2 = 2,
    Distance2Add = 3,
    Distance2Sub = 4,
    Distance2Mul = 5,
    Distance2Div = 6,
]);

/// Coordinate warp applied before the base noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbType {
    /// Coordinates are used as given.
    #[default]
    None,
    /// One octave of gradient offset per axis.
    Gradient,
    /// Several octaves of gradient offset per axis.
    GradientFractal,
    /// Coordinate vector rescaled to a fixed length.
    Normalise,
    /// [`PerturbType::Gradient`] then [`PerturbType::Normalise`].
    GradientNormalise,
    /// [`PerturbType::GradientFractal`] then [`PerturbType::Normalise`].
    GradientFractalNormalise,
}

impl PerturbType {
    const fn gradient_octaves(self, octaves: u32) -> u32 {
        match self {
            Self::None | Self::Normalise => 0,
            Self::Gradient | Self::GradientNormalise => 1,
            Self::GradientFractal | Self::GradientFractalNormalise => octaves,
        }
    }

    const fn normalises(self) -> bool {
        matches!(
            self,
            Self::Normalise | Self::GradientNormalise | Self::GradientFractalNormalise
        )
    }
}

int_coded!(PerturbType, "perturb type", [
    None = 0,
    Gradient = 1,
    GradientFractal = 2,
    Normalise = 3,
    GradientNormalise = 4,
    GradientFractalNormalise = 5,
]);

/// Cellular search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellularParams {
    /// Distance metric.
    pub distance: CellularDistance,
    /// Value produced from the two nearest distances.
    pub return_type: CellularReturnType,
    /// Feature point spread inside its cell, `0` (centered) to `1`.
    pub jitter: f32,
}

/// Coordinate warp parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbParams {
    /// Warp kind.
    pub kind: PerturbType,
    /// Offset scale, in frequency-scaled units.
    pub amplitude: f32,
    /// Frequency of the warp noise relative to the scaled coordinate.
    pub frequency: f32,
    /// Octaves of the fractal warp.
    pub octaves: u32,
    /// Frequency multiplier per warp octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per warp octave.
    pub gain: f32,
    /// Target length of normalised coordinates.
    pub normalise_length: f32,
}

/// Validated, kernel-ready noise parameters.
///
/// Produced by the configuration layer in `vecnoise-core`; kernels trust these
/// values and do no checking of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Base algorithm.
    pub noise: NoiseType,
    /// Octave combination.
    pub fractal: FractalType,
    /// Seed of the first octave.
    pub seed: i32,
    /// Coordinate scale applied before anything else.
    pub frequency: f32,
    /// Number of octaves, at least one.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
    /// `1 / sum(gain^i)`, normalising the fractal sum.
    pub bounding: f32,
    /// Cellular parameters, ignored by other algorithms.
    pub cellular: CellularParams,
    /// Coordinate warp.
    pub perturb: PerturbParams,
}

impl NoiseParams {
    /// `1 / sum_{i < octaves} gain^i`.
    #[must_use]
    pub fn fractal_bounding(gain: f32, octaves: u32) -> f32 {
        let mut amp = 1.0f32;
        let mut total = 0.0f32;
        for _ in 0..octaves.max(1) {
            total += amp;
            amp *= gain;
        }
        1.0 / total
    }
}

/// Evaluates the configured noise at `LANES` points.
#[inline(always)]
pub(crate) fn sample<S: Backend, const D: usize>(
    params: &NoiseParams,
    mut point: [S::F32; 4],
) -> S::F32 {
    let frequency = S::F32::splat(params.frequency);
    for axis in point.iter_mut().take(D) {
        *axis = *axis * frequency;
    }
    perturb::apply::<S, D>(&params.perturb, params.seed, &mut point);
    fractal::combine::<S, D>(params, &point)
}

/// One octave of the base algorithm.
#[inline(always)]
fn base<S: Backend, const D: usize>(params: &NoiseParams, seed: i32, point: &[S::F32; 4]) -> S::F32 {
    let seed = S::I32::splat(seed);
    match params.noise {
        NoiseType::Value => value::value::<S, D>(seed, point),
        NoiseType::Perlin => perlin::perlin::<S, D>(seed, point),
        NoiseType::Simplex => simplex::simplex::<S, D>(seed, point),
        NoiseType::Cellular => cellular::cellular::<S, D>(&params.cellular, seed, point),
        NoiseType::White => white::white::<S, D>(seed, point),
        NoiseType::Cubic => cubic::cubic::<S, D>(seed, point),
    }
}

/// `6t^5 - 15t^4 + 10t^3`
#[inline(always)]
fn quintic<S: Backend>(t: S::F32) -> S::F32 {
    let s = |v: f32| S::F32::splat(v);
    let inner = S::mul_add(t, S::mul_add(t, s(6.0), s(-15.0)), s(10.0));
    t * t * t * inner
}

/// `a + (b - a) * t`
#[inline(always)]
fn lerp<S: Backend>(a: S::F32, b: S::F32, t: S::F32) -> S::F32 {
    S::mul_add(b - a, t, a)
}

/// `value` where bit `bit` of `hash` is clear, `-value` where it is set.
#[inline(always)]
fn negate_if_bit<S: Backend>(value: S::F32, hash: S::I32, bit: i32) -> S::F32 {
    let clear = (hash & S::I32::splat(bit)).cmp_eq(S::I32::splat(0));
    S::F32::select(clear, value, -value)
}

/// Whether the masked bits of `hash` equal `expected`.
#[inline(always)]
fn bits_eq<S: Backend>(hash: S::I32, mask: i32, expected: i32) -> S::Mask {
    (hash & S::I32::splat(mask)).cmp_eq(S::I32::splat(expected))
}

/// Dot product of offset `d` with the gradient selected by `hash`.
///
/// 2D picks one of the four diagonals, 3D one of the sixteen improved-noise
/// edge gradients, 4D one of thirty-two edge gradients.
#[inline(always)]
fn grad_dot<S: Backend, const D: usize>(hash: S::I32, d: &[S::F32; 4]) -> S::F32 {
    match D {
        2 => negate_if_bit::<S>(d[0], hash, 1) + negate_if_bit::<S>(d[1], hash, 2),
        3 => grad3::<S>(hash, d[0], d[1], d[2]),
        _ => grad4::<S>(hash, d),
    }
}

#[inline(always)]
fn grad3<S: Backend>(hash: S::I32, x: S::F32, y: S::F32, z: S::F32) -> S::F32 {
    let h = hash & S::I32::splat(15);
    let u = S::F32::select(S::I32::splat(8).cmp_gt(h), x, y);
    let x_for_v = bits_eq::<S>(h, 15, 12) | bits_eq::<S>(h, 15, 14);
    let v = S::F32::select(
        S::I32::splat(4).cmp_gt(h),
        y,
        S::F32::select(x_for_v, x, z),
    );
    negate_if_bit::<S>(u, h, 1) + negate_if_bit::<S>(v, h, 2)
}

#[inline(always)]
fn grad4<S: Backend>(hash: S::I32, d: &[S::F32; 4]) -> S::F32 {
    let [x, y, z, w] = *d;
    // Which axis the gradient leaves out.
    let q = hash.shr(3) & S::I32::splat(3);
    let zero = S::I32::splat(0);
    let a = S::F32::select(q.cmp_eq(zero), y, x);
    let b = S::F32::select(S::I32::splat(2).cmp_gt(q), z, y);
    let c = S::F32::select(q.cmp_eq(S::I32::splat(3)), z, w);
    negate_if_bit::<S>(a, hash, 1) + negate_if_bit::<S>(b, hash, 2) + negate_if_bit::<S>(c, hash, 4)
}
