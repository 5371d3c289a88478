//! Grid fill driver.
//!
//! Splits the output into tasks of whole batches. Each task owns a disjoint
//! slice of the buffer, builds its own coordinates and runs the bound kernel,
//! so results do not depend on how tasks are scheduled.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use vecnoise_utils::{BATCH_LANES, CoordBatch, Lanes, NoiseParams};

use crate::config::NoiseConfig;
use crate::dispatch::KernelBinding;
use crate::error::{NoiseError, Result};
use crate::grid::{CoordSource, GridRegion, PointSet};

/// Batches handed to a worker at a time.
const BATCHES_PER_TASK: usize = 64;
const TASK_VALUES: usize = BATCHES_PER_TASK * BATCH_LANES;

/// Where fill tasks run.
#[derive(Debug, Clone, Default)]
pub enum Workers {
    /// Sequentially on the calling thread.
    Current,
    /// On rayon's global pool.
    #[default]
    Global,
    /// On a dedicated pool.
    Threads(Arc<ThreadPool>),
}

impl Workers {
    /// A dedicated pool with `threads` workers.
    pub fn threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(NoiseError::InvalidConfig("worker count must be at least 1".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vecnoise-{i}"))
            .build()
            .map_err(|e| NoiseError::InvalidConfig(format!("failed to start worker pool: {e}")))?;
        Ok(Self::Threads(Arc::new(pool)))
    }
}

/// Cooperative cancellation flag, checked before every batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every fill holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Scheduling options for a fill.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Where tasks run.
    pub workers: Workers,
    /// Optional cancellation flag.
    pub cancel: Option<CancelToken>,
}

/// Fills `out` with noise sampled over `region` on rayon's global pool.
pub fn fill(
    region: &GridRegion,
    config: &NoiseConfig,
    binding: &KernelBinding,
    out: &mut [f32],
) -> Result<()> {
    fill_with(region, config, binding, out, &FillOptions::default())
}

/// Fills `out` with noise sampled over `region`.
///
/// Every argument is checked before `out` is written. On
/// [`NoiseError::WorkerFailure`] or [`NoiseError::Cancelled`] the contents of
/// `out` are unspecified.
#[tracing::instrument(level = "trace", skip_all)]
pub fn fill_with(
    region: &GridRegion,
    config: &NoiseConfig,
    binding: &KernelBinding,
    out: &mut [f32],
    options: &FillOptions,
) -> Result<()> {
    let params = prepare(config, binding)?;
    let total = region.validate()?;
    drive(region, total, &params, binding, out, options)
}

/// Fills `out[i]` with noise at point `i` of `points` on rayon's global pool.
pub fn fill_points(
    points: &PointSet<'_>,
    config: &NoiseConfig,
    binding: &KernelBinding,
    out: &mut [f32],
) -> Result<()> {
    fill_points_with(points, config, binding, out, &FillOptions::default())
}

/// Fills `out[i]` with noise at point `i` of `points`.
#[tracing::instrument(level = "trace", skip_all)]
pub fn fill_points_with(
    points: &PointSet<'_>,
    config: &NoiseConfig,
    binding: &KernelBinding,
    out: &mut [f32],
    options: &FillOptions,
) -> Result<()> {
    let params = prepare(config, binding)?;
    drive(points, points.len(), &params, binding, out, options)
}

fn prepare(config: &NoiseConfig, binding: &KernelBinding) -> Result<NoiseParams> {
    let params = config.prepare()?;
    binding.check_algorithm(params.noise)?;
    Ok(params)
}

fn check_buffer(binding: &KernelBinding, out: &[f32], total: usize) -> Result<()> {
    let required = binding.alignment();
    let address = out.as_ptr().addr();
    if !address.is_multiple_of(required) {
        return Err(NoiseError::BufferMisaligned { required, address });
    }
    if out.len() < total {
        return Err(NoiseError::BufferTooSmall {
            required: total,
            actual: out.len(),
        });
    }
    Ok(())
}

fn drive<C: CoordSource>(
    source: &C,
    total: usize,
    params: &NoiseParams,
    binding: &KernelBinding,
    out: &mut [f32],
    options: &FillOptions,
) -> Result<()> {
    check_buffer(binding, out, total)?;
    let out = &mut out[..total];
    let cancel = options.cancel.as_ref();
    log::trace!(
        "Filling {total} values on {} ({} tasks)",
        binding.tier(),
        total.div_ceil(TASK_VALUES)
    );

    let task = |(index, chunk): (usize, &mut [f32])| {
        panic::catch_unwind(AssertUnwindSafe(|| {
            run_task(source, binding, params, index * TASK_VALUES, chunk, cancel)
        }))
        .unwrap_or_else(|payload| {
            Err(NoiseError::WorkerFailure {
                task: index,
                reason: panic_message(&*payload),
            })
        })
    };

    match &options.workers {
        Workers::Current => out.chunks_mut(TASK_VALUES).enumerate().try_for_each(task),
        Workers::Global => out.par_chunks_mut(TASK_VALUES).enumerate().try_for_each(task),
        Workers::Threads(pool) => {
            pool.install(|| out.par_chunks_mut(TASK_VALUES).enumerate().try_for_each(task))
        }
    }
}

fn run_task<C: CoordSource>(
    source: &C,
    binding: &KernelBinding,
    params: &NoiseParams,
    start: usize,
    chunk: &mut [f32],
    cancel: Option<&CancelToken>,
) -> Result<()> {
    let mut batch = CoordBatch::new(source.dims());
    let mut lanes = Lanes::ZERO;
    for (i, dst) in chunk.chunks_mut(BATCH_LANES).enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(NoiseError::Cancelled);
        }
        let count = dst.len();
        source.load(start + i * BATCH_LANES, count, &mut batch);
        if count < BATCH_LANES {
            batch.fill_from(count - 1, count);
        }
        binding.evaluate_prepared(&batch, params, &mut lanes);
        dst.copy_from_slice(&lanes.0[..count]);
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use vecnoise_utils::NoiseType;

    use super::*;
    use crate::buffer::AlignedBuffer;
    use crate::detect::{CapabilityDescriptor, detect};
    use crate::dispatch::bind;

    fn region() -> GridRegion {
        GridRegion::new_3d([0.0; 3], [19, 7, 13], [1.0; 3])
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let config = NoiseConfig::new(NoiseType::Simplex);
        let binding = bind(detect(), &config).unwrap();
        let total = region().len();

        let mut expected = AlignedBuffer::new(total);
        let current = FillOptions {
            workers: Workers::Current,
            cancel: None,
        };
        fill_with(&region(), &config, &binding, &mut expected, &current).unwrap();

        let mut global = AlignedBuffer::new(total);
        fill(&region(), &config, &binding, &mut global).unwrap();
        assert_eq!(expected, global);

        let mut pooled = AlignedBuffer::new(total);
        let options = FillOptions {
            workers: Workers::threads(3).unwrap(),
            cancel: None,
        };
        fill_with(&region(), &config, &binding, &mut pooled, &options).unwrap();
        assert_eq!(expected, pooled);
    }

    #[test]
    fn test_larger_buffer_tail_untouched() {
        let config = NoiseConfig::new(NoiseType::Value);
        let binding = bind(detect(), &config).unwrap();
        let total = region().len();
        let mut out = AlignedBuffer::new(total + 5);
        out.fill(7.0);
        fill(&region(), &config, &binding, &mut out).unwrap();
        assert!(out[total..].iter().all(|v| v.to_bits() == 7.0f32.to_bits()));
    }

    #[test]
    fn test_rejects_small_and_misaligned_buffers() {
        let config = NoiseConfig::default();
        let binding = bind(detect(), &config).unwrap();
        let total = region().len();

        let mut small = AlignedBuffer::new(total - 1);
        assert_eq!(
            fill(&region(), &config, &binding, &mut small),
            Err(NoiseError::BufferTooSmall {
                required: total,
                actual: total - 1
            })
        );

        if binding.alignment() > 4 {
            let mut buffer = AlignedBuffer::new(total + 1);
            assert!(matches!(
                fill(&region(), &config, &binding, &mut buffer[1..]),
                Err(NoiseError::BufferMisaligned { .. })
            ));
        }
    }

    #[test]
    fn test_scalar_accepts_any_float_alignment() {
        let config = NoiseConfig::default();
        let binding = bind(CapabilityDescriptor::scalar_only(), &config).unwrap();
        let mut buffer = AlignedBuffer::new(region().len() + 1);
        assert!(fill(&region(), &config, &binding, &mut buffer[1..]).is_ok());
    }

    #[test]
    fn test_cancelled_before_start() {
        let config = NoiseConfig::default();
        let binding = bind(detect(), &config).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let options = FillOptions {
            workers: Workers::Current,
            cancel: Some(token),
        };
        let mut out = AlignedBuffer::new(region().len());
        assert_eq!(
            fill_with(&region(), &config, &binding, &mut out, &options),
            Err(NoiseError::Cancelled)
        );
    }

    #[test]
    fn test_points_match_grid() {
        let config = NoiseConfig::new(NoiseType::Perlin);
        let binding = bind(detect(), &config).unwrap();
        let region = GridRegion::new_2d([3.0, -2.0], [5, 4], [0.5, 1.5]);
        let mut grid = AlignedBuffer::new(region.len());
        fill(&region, &config, &binding, &mut grid).unwrap();

        let (xs, ys): (Vec<f32>, Vec<f32>) = (0..region.len())
            .map(|i| {
                let p = region.point_at(i);
                (p[0], p[1])
            })
            .unzip();
        let points = PointSet::new(&[&xs, &ys]).unwrap();
        let mut out = AlignedBuffer::new(points.len());
        fill_points(&points, &config, &binding, &mut out).unwrap();
        assert_eq!(grid, out);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Workers::threads(0).is_err());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&5u8), "unknown panic");
    }
}
