//! Output storage aligned for every vector tier.

use std::ops::{Deref, DerefMut};
use std::slice;

use vecnoise_utils::{BATCH_LANES, Dims, Lanes};

/// A zero-initialised `f32` buffer whose first element is 64-byte aligned.
///
/// Any tier's [`crate::KernelBinding::alignment`] divides 64, so an
/// `AlignedBuffer` is always accepted by [`crate::fill`].
#[derive(Debug, Clone)]
pub struct AlignedBuffer {
    blocks: Vec<Lanes>,
    len: usize,
}

impl AlignedBuffer {
    /// A buffer of `len` zeros.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            blocks: vec![Lanes::ZERO; len.div_ceil(BATCH_LANES)],
            len,
        }
    }

    /// Number of values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: `Lanes` is `repr(C)` over `[f32; BATCH_LANES]`, so the blocks are
        // contiguous `f32`s, and `len <= blocks.len() * BATCH_LANES`.
        unsafe { slice::from_raw_parts(self.blocks.as_ptr().cast::<f32>(), self.len) }
    }

    /// The values, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: as in `as_slice`; the unique borrow of `self` covers the blocks.
        unsafe { slice::from_raw_parts_mut(self.blocks.as_mut_ptr().cast::<f32>(), self.len) }
    }

    /// Copies the values into a plain vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.as_slice().to_vec()
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.as_slice()
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [f32] {
        self.as_mut_slice()
    }
}

/// Noise values for a [`crate::GridRegion`], laid out `x` fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseGrid {
    buffer: AlignedBuffer,
    counts: [usize; 4],
    dims: Dims,
}

impl NoiseGrid {
    pub(crate) fn new(buffer: AlignedBuffer, counts: &[usize], dims: Dims) -> Self {
        let mut padded = [1usize; 4];
        padded[..counts.len()].copy_from_slice(counts);
        Self {
            buffer,
            counts: padded,
            dims,
        }
    }

    /// Dimensionality.
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Samples per axis, `x` first.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts[..self.dims.count()]
    }

    /// Samples per axis, slowest axis first, as in `[nz][ny][nx]`.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.counts().iter().rev().copied().collect()
    }

    /// The value at `index` (`x` first), or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.dims.count() {
            return None;
        }
        let mut offset = 0;
        for (axis, &i) in index.iter().enumerate().rev() {
            if i >= self.counts[axis] {
                return None;
            }
            offset = offset * self.counts[axis] + i;
        }
        self.buffer.get(offset).copied()
    }

    /// All values in memory order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.buffer
    }

    /// Releases the underlying buffer.
    #[must_use]
    pub fn into_buffer(self) -> AlignedBuffer {
        self.buffer
    }
}
