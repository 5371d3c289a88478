//! Command-line front end: runs a noise job file and reports on the result.

mod config;

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;
use vecnoise_core::{Noise, NoiseGrid, Workers};

use crate::config::NoiseJob;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    set_global_default(subscriber).context("failed to install subscriber")?;
    LogTracer::init().context("failed to forward log records")?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let Some(path) = env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: vecnoise <job.json5>");
    };
    let job = NoiseJob::load(&path)?;
    run(&job)
}

fn run(job: &NoiseJob) -> Result<()> {
    let region = job.region.to_region()?;
    let mut builder = Noise::builder().config(job.noise);
    if let Some(tier) = job.max_tier {
        builder = builder.max_tier(tier);
    }
    if let Some(threads) = job.workers {
        builder = builder.workers(Workers::threads(threads)?);
    }
    let noise = builder.build().context("failed to bind noise kernel")?;
    log::info!(
        "{:?} noise on {} ({} values)",
        job.noise.noise,
        noise.tier(),
        region.len()
    );

    let start = Instant::now();
    let grid = noise.generate(&region).context("fill failed")?;
    log::info!("Filled in {:?}", start.elapsed());

    let stats = Stats::of(grid.values());
    log::info!(
        "min {:.6}  max {:.6}  mean {:.6}",
        stats.min,
        stats.max,
        stats.mean
    );

    if let Some(output) = &job.output {
        write_raw(output, &grid)?;
        log::info!("Wrote {:?} to {}", grid.shape(), output.display());
    }
    Ok(())
}

struct Stats {
    min: f32,
    max: f32,
    mean: f64,
}

impl Stats {
    fn of(values: &[f32]) -> Self {
        let (min, max, sum) = values.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + f64::from(v)),
        );
        Self {
            min,
            max,
            mean: sum / values.len().max(1) as f64,
        }
    }
}

fn write_raw(path: &Path, grid: &NoiseGrid) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for value in grid.values() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}
