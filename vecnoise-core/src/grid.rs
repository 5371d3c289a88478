//! Sample locations: regular grids and arbitrary point sets.

use vecnoise_utils::{CoordBatch, Dims};

use crate::error::{NoiseError, Result};

/// A regular 2D, 3D or 4D lattice of sample points.
///
/// Sample `(i, j, k, l)` sits at `origin + (i, j, k, l) * step` and is stored at
/// offset `((l * nz + k) * ny + j) * nx + i`: row-major with `x` fastest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRegion {
    origin: [f32; 4],
    counts: [usize; 4],
    step: [f32; 4],
    dims: Dims,
}

impl GridRegion {
    /// A 2D region.
    #[must_use]
    pub const fn new_2d(origin: [f32; 2], counts: [usize; 2], step: [f32; 2]) -> Self {
        Self {
            origin: [origin[0], origin[1], 0.0, 0.0],
            counts: [counts[0], counts[1], 1, 1],
            step: [step[0], step[1], 0.0, 0.0],
            dims: Dims::Two,
        }
    }

    /// A 3D region.
    #[must_use]
    pub const fn new_3d(origin: [f32; 3], counts: [usize; 3], step: [f32; 3]) -> Self {
        Self {
            origin: [origin[0], origin[1], origin[2], 0.0],
            counts: [counts[0], counts[1], counts[2], 1],
            step: [step[0], step[1], step[2], 0.0],
            dims: Dims::Three,
        }
    }

    /// A 4D region.
    #[must_use]
    pub const fn new_4d(origin: [f32; 4], counts: [usize; 4], step: [f32; 4]) -> Self {
        Self {
            origin,
            counts,
            step,
            dims: Dims::Four,
        }
    }

    /// A region from per-axis slices, which must all have 2, 3 or 4 entries.
    pub fn from_slices(origin: &[f32], counts: &[usize], step: &[f32]) -> Result<Self> {
        let dims = Dims::from_count(origin.len()).ok_or_else(|| {
            NoiseError::InvalidRegion(format!("expected 2 to 4 axes, got {}", origin.len()))
        })?;
        if counts.len() != origin.len() || step.len() != origin.len() {
            return Err(NoiseError::InvalidRegion(format!(
                "axis count mismatch: origin {}, counts {}, step {}",
                origin.len(),
                counts.len(),
                step.len()
            )));
        }
        let mut region = Self {
            origin: [0.0; 4],
            counts: [1; 4],
            step: [0.0; 4],
            dims,
        };
        region.origin[..origin.len()].copy_from_slice(origin);
        region.counts[..counts.len()].copy_from_slice(counts);
        region.step[..step.len()].copy_from_slice(step);
        Ok(region)
    }

    /// Dimensionality.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Coordinates of sample `(0, 0, 0, 0)`.
    #[must_use]
    pub fn origin(&self) -> &[f32] {
        &self.origin[..self.dims.count()]
    }

    /// Samples per axis, `x` first.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts[..self.dims.count()]
    }

    /// Spacing per axis.
    #[must_use]
    pub fn step(&self) -> &[f32] {
        &self.step[..self.dims.count()]
    }

    /// Total number of samples, saturating on overflow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts().iter().fold(1usize, |acc, n| acc.saturating_mul(*n))
    }

    /// Whether any axis has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts().contains(&0)
    }

    /// Checks the region and returns its exact sample count.
    pub fn validate(&self) -> Result<usize> {
        if self.is_empty() {
            return Err(NoiseError::InvalidRegion(format!(
                "every axis needs at least one sample, got {:?}",
                self.counts()
            )));
        }
        let total = self
            .counts()
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n))
            .ok_or_else(|| {
                NoiseError::InvalidRegion(format!("sample count {:?} overflows", self.counts()))
            })?;
        if total.checked_mul(size_of::<f32>()).is_none_or(|bytes| bytes > isize::MAX as usize) {
            return Err(NoiseError::InvalidRegion(format!(
                "{total} samples exceed the addressable size"
            )));
        }
        if !self.origin().iter().chain(self.step()).all(|v| v.is_finite()) {
            return Err(NoiseError::InvalidRegion(
                "origin and step must be finite".into(),
            ));
        }
        for (axis, &n) in self.counts().iter().enumerate() {
            let far = self.origin[axis] + (n - 1) as f32 * self.step[axis];
            if !far.is_finite() {
                return Err(NoiseError::InvalidRegion(format!(
                    "axis {axis} ends at {far}, outside the finite range"
                )));
            }
        }
        Ok(total)
    }

    /// Linear offset of sample `index` (`x` first).
    ///
    /// # Panics
    /// If `index` has fewer entries than the region has axes.
    #[must_use]
    pub fn offset(&self, index: &[usize]) -> usize {
        let [nx, ny, nz, _] = self.counts;
        let mut at = [0usize; 4];
        at[..self.dims.count()].copy_from_slice(&index[..self.dims.count()]);
        let [i, j, k, l] = at;
        ((l * nz + k) * ny + j) * nx + i
    }

    /// Coordinates of the sample at `offset`.
    #[must_use]
    pub fn point_at(&self, offset: usize) -> [f32; 4] {
        GridCursor::new(self, offset).point()
    }
}

/// Walks a [`GridRegion`] in memory order from an arbitrary offset.
#[derive(Debug, Clone)]
pub struct GridCursor<'a> {
    region: &'a GridRegion,
    index: [usize; 4],
}

impl<'a> GridCursor<'a> {
    /// A cursor positioned at linear `offset`.
    #[must_use]
    pub fn new(region: &'a GridRegion, offset: usize) -> Self {
        let mut index = [0usize; 4];
        let mut rest = offset;
        for (axis, count) in region.counts.iter().enumerate() {
            index[axis] = rest % count;
            rest /= count;
        }
        Self { region, index }
    }

    /// Coordinates of the current sample.
    #[must_use]
    pub fn point(&self) -> [f32; 4] {
        let mut point = [0.0f32; 4];
        for (axis, value) in point.iter_mut().enumerate() {
            *value = self.region.origin[axis] + self.index[axis] as f32 * self.region.step[axis];
        }
        point
    }

    /// Moves to the next sample in memory order.
    pub fn advance(&mut self) {
        for (axis, count) in self.region.counts.iter().enumerate() {
            self.index[axis] += 1;
            if self.index[axis] < *count {
                return;
            }
            self.index[axis] = 0;
        }
    }
}

/// Structure-of-arrays coordinates of arbitrary sample points.
#[derive(Debug, Clone, Copy)]
pub struct PointSet<'a> {
    axes: [&'a [f32]; 4],
    dims: Dims,
    len: usize,
}

impl<'a> PointSet<'a> {
    /// One slice per axis; all must have the same, non-zero length and hold
    /// finite values.
    pub fn new(axes: &[&'a [f32]]) -> Result<Self> {
        let dims = Dims::from_count(axes.len()).ok_or_else(|| {
            NoiseError::InvalidRegion(format!("expected 2 to 4 axes, got {}", axes.len()))
        })?;
        let len = axes[0].len();
        if len == 0 {
            return Err(NoiseError::InvalidRegion("point set is empty".into()));
        }
        if let Some(bad) = axes.iter().position(|a| a.len() != len) {
            return Err(NoiseError::InvalidRegion(format!(
                "axis {bad} has {} points, axis 0 has {len}",
                axes[bad].len()
            )));
        }
        if !axes.iter().all(|a| a.iter().all(|v| v.is_finite())) {
            return Err(NoiseError::InvalidRegion("point coordinates must be finite".into()));
        }
        let mut padded: [&'a [f32]; 4] = [&[]; 4];
        padded[..axes.len()].copy_from_slice(axes);
        Ok(Self {
            axes: padded,
            dims,
            len,
        })
    }

    /// Dimensionality.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty sets are rejected by [`PointSet::new`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Something the fill driver can draw coordinates from.
pub(crate) trait CoordSource: Sync {
    fn dims(&self) -> Dims;

    /// Writes points `start..start + count` into the first `count` lanes.
    fn load(&self, start: usize, count: usize, batch: &mut CoordBatch);
}

impl CoordSource for GridRegion {
    fn dims(&self) -> Dims {
        self.dims
    }

    fn load(&self, start: usize, count: usize, batch: &mut CoordBatch) {
        let mut cursor = GridCursor::new(self, start);
        for lane in 0..count {
            batch.set_point(lane, &cursor.point());
            cursor.advance();
        }
    }
}

impl CoordSource for PointSet<'_> {
    fn dims(&self) -> Dims {
        self.dims
    }

    fn load(&self, start: usize, count: usize, batch: &mut CoordBatch) {
        for (axis, lanes) in self.axes.iter().zip(batch.axes.iter_mut()).take(self.dims.count()) {
            lanes.0[..count].copy_from_slice(&axis[start..start + count]);
        }
    }
}
