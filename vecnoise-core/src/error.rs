//! Errors raised at the engine boundary.

use thiserror::Error;
use vecnoise_utils::NoiseType;

/// Result alias used throughout `vecnoise-core`.
pub type Result<T> = std::result::Result<T, NoiseError>;

/// An error that can occur while binding a kernel or filling a buffer.
///
/// Everything except [`NoiseError::WorkerFailure`] and [`NoiseError::Cancelled`]
/// is detected before the output buffer is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoiseError {
    /// A configuration parameter is out of range.
    #[error("invalid noise configuration: {0}")]
    InvalidConfig(String),
    /// The requested region or point set is empty, too large or not finite.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    /// No registered kernel implements the algorithm on any supported tier.
    #[error("no kernel available for {algorithm:?}")]
    UnsupportedAlgorithm {
        /// The algorithm that was requested.
        algorithm: NoiseType,
    },
    /// The output buffer does not start on the bound kernel's vector width.
    #[error("output buffer at {address:#x} is not aligned to {required} bytes")]
    BufferMisaligned {
        /// Required alignment in bytes.
        required: usize,
        /// Address of the first element.
        address: usize,
    },
    /// The output buffer holds fewer elements than the region.
    #[error("output buffer holds {actual} values, region needs {required}")]
    BufferTooSmall {
        /// Elements the region needs.
        required: usize,
        /// Elements the buffer holds.
        actual: usize,
    },
    /// A fill task panicked. The buffer contents are unspecified.
    #[error("worker failed on task {task}: {reason}")]
    WorkerFailure {
        /// Index of the first failing task.
        task: usize,
        /// Panic message, if it was a string.
        reason: String,
    },
    /// The fill was cancelled between batches. The buffer is partially written.
    #[error("fill cancelled")]
    Cancelled,
}
