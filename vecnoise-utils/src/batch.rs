//! Fixed-size coordinate and result batches passed to kernels.
//!
//! A batch always holds [`BATCH_LANES`] points, the width of the widest tier.
//! Narrower tiers walk the batch in register-sized steps, so every kernel shares
//! one signature and the fill driver never has to know the bound vector width.

use serde::{Deserialize, Serialize};

use crate::simd::MAX_LANES;

/// Points per batch.
pub const BATCH_LANES: usize = MAX_LANES;

/// One `f32` per batch lane, aligned for the widest vector load.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(64))]
pub struct Lanes(pub [f32; BATCH_LANES]);

impl Lanes {
    /// All lanes zero.
    pub const ZERO: Self = Self([0.0; BATCH_LANES]);

    /// Every lane set to `value`.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self([value; BATCH_LANES])
    }

    /// The lanes as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Default for Lanes {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Dimensionality of the points in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dims {
    /// `x, y`
    Two,
    /// `x, y, z`
    Three,
    /// `x, y, z, w`
    Four,
}

impl Dims {
    /// Number of coordinate axes.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Maps an axis count to a dimensionality, `None` outside `2..=4`.
    #[must_use]
    pub const fn from_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

/// Structure-of-arrays coordinates for one batch.
///
/// Axes beyond [`CoordBatch::dims`] are ignored by the kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordBatch {
    /// Per-axis lane values: `x, y, z, w`.
    pub axes: [Lanes; 4],
    /// How many of `axes` are meaningful.
    pub dims: Dims,
}

impl CoordBatch {
    /// A batch with every coordinate at the origin.
    #[must_use]
    pub const fn new(dims: Dims) -> Self {
        Self {
            axes: [Lanes::ZERO; 4],
            dims,
        }
    }

    /// A batch with `point` replicated into every lane.
    ///
    /// Returns `None` when `point` does not have 2, 3 or 4 components.
    #[must_use]
    pub fn from_point(point: &[f32]) -> Option<Self> {
        let dims = Dims::from_count(point.len())?;
        let mut batch = Self::new(dims);
        for (axis, &value) in batch.axes.iter_mut().zip(point) {
            *axis = Lanes::splat(value);
        }
        Some(batch)
    }

    /// Writes `point` into `lane`. Extra components are ignored.
    ///
    /// # Panics
    /// If `lane >= BATCH_LANES`.
    #[inline]
    pub fn set_point(&mut self, lane: usize, point: &[f32]) {
        for (axis, &value) in self.axes.iter_mut().zip(point).take(self.dims.count()) {
            axis.0[lane] = value;
        }
    }

    /// Copies `lane` into every lane from `from` onward.
    ///
    /// Used to pad a partial batch with its last real point.
    pub fn fill_from(&mut self, lane: usize, from: usize) {
        for axis in &mut self.axes {
            let value = axis.0[lane];
            axis.0[from..].fill(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_alignment() {
        assert_eq!(align_of::<Lanes>(), 64);
        assert_eq!(size_of::<Lanes>(), BATCH_LANES * 4);
    }

    #[test]
    fn test_from_point_rejects_bad_arity() {
        assert!(CoordBatch::from_point(&[1.0]).is_none());
        assert!(CoordBatch::from_point(&[1.0; 5]).is_none());

        let batch = CoordBatch::from_point(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(batch.dims, Dims::Three);
        assert_eq!(batch.axes[2], Lanes::splat(3.0));
        assert_eq!(batch.axes[3], Lanes::ZERO);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_fill_from_pads_with_last_point() {
        let mut batch = CoordBatch::new(Dims::Two);
        batch.set_point(0, &[1.0, 2.0]);
        batch.set_point(1, &[3.0, 4.0]);
        batch.fill_from(1, 2);

        assert!(batch.axes[0].0[2..].iter().all(|&v| v == 3.0));
        assert!(batch.axes[1].0[2..].iter().all(|&v| v == 4.0));
        assert_eq!(batch.axes[0].0[0], 1.0);
    }
}
