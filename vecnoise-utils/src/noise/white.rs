//! White noise: a hash of the raw coordinate bits.

use super::hash::{PRIMES, hash, to_unit};
use crate::simd::{Backend, SimdFloat, SimdInt};

#[inline(always)]
pub(super) fn white<S: Backend, const D: usize>(seed: S::I32, point: &[S::F32; 4]) -> S::F32 {
    let mut mixed = [S::I32::splat(0); 4];
    for axis in 0..D {
        let bits = point[axis].to_bits();
        mixed[axis] = (bits ^ bits.shr(16)) * S::I32::splat(PRIMES[axis]);
    }
    to_unit::<S>(hash::<S, D>(seed, &mixed))
}
