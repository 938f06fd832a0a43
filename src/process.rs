//! File-to-file pipeline: decode, filter in parallel, encode.

use core::num::NonZeroUsize;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Instant;

use enough::Unstoppable;

use crate::bmp::{DecodeRequest, Image, encode_bmp};
use crate::dispatch::{DispatchOptions, DispatchReport, WaitMode, dispatch};
use crate::error::ProcessError;
use crate::filter::{Filter, Strategy};
use crate::limits::Limits;
use crate::pool::WorkerPool;

/// Pipeline settings.
///
/// ```
/// use parbmp::{ProcessorConfig, WaitMode};
///
/// let config = ProcessorConfig::default()
///     .with_threads(4)
///     .with_rows_per_task(8)
///     .with_wait(WaitMode::Block);
/// assert_eq!(config.threads, Some(4));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ProcessorConfig {
    /// Worker count. `None` uses two workers per logical core.
    pub threads: Option<usize>,
    pub rows_per_task: Option<NonZeroUsize>,
    pub wait: WaitMode,
    pub strategy: Strategy,
    pub limits: Limits,
}

impl ProcessorConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// `0` falls back to one row per task.
    pub fn with_rows_per_task(mut self, rows: usize) -> Self {
        self.rows_per_task = NonZeroUsize::new(rows);
        self
    }

    pub fn with_wait(mut self, wait: WaitMode) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            rows_per_task: self.rows_per_task.unwrap_or(NonZeroUsize::MIN),
            wait: self.wait,
            strategy: self.strategy,
        }
    }
}

/// Owns a worker pool and runs filters on images and files.
#[derive(Debug)]
pub struct Processor {
    pool: WorkerPool,
    config: ProcessorConfig,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Result<Self, ProcessError> {
        let pool = match config.threads {
            Some(threads) => WorkerPool::new(threads)?,
            None => WorkerPool::with_default_size()?,
        };
        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Filter an image in place.
    pub fn apply(&self, image: &mut Image, filter: &Filter) -> Result<DispatchReport, ProcessError> {
        let report = dispatch(
            &self.pool,
            image.pixels_mut(),
            filter,
            &self.config.dispatch_options(),
        )?;
        Ok(report)
    }

    /// Read `source`, apply `filter` and write the result to `destination`.
    ///
    /// The destination is created only after the image was decoded,
    /// filtered and encoded in memory.
    pub fn process_file(
        &self,
        source: &Path,
        destination: &Path,
        filter: &Filter,
    ) -> Result<DispatchReport, ProcessError> {
        // Reject bad parameters before touching the file system.
        filter.validate()?;

        let started = Instant::now();
        let file = File::open(source).map_err(|source_err| ProcessError::Open {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let mut image = DecodeRequest::new()
            .with_limits(&self.config.limits)
            .read(&mut BufReader::new(file), Unstoppable)
            .map_err(|err| ProcessError::Bitmap {
                path: source.to_path_buf(),
                source: err,
            })?;
        let decoded = started.elapsed();

        let report = self.apply(&mut image, filter)?;

        let encode_started = Instant::now();
        let bytes = encode_bmp(&image, Unstoppable).map_err(|err| ProcessError::Bitmap {
            path: destination.to_path_buf(),
            source: err,
        })?;
        write_file(destination, &bytes)?;
        let encoded = encode_started.elapsed();

        tracing::info!(
            filter = filter.name(),
            width = image.width(),
            height = image.height(),
            threads = self.pool.threads(),
            tasks = report.tasks,
            decode_ms = decoded.as_secs_f64() * 1e3,
            filter_ms = report.elapsed.as_secs_f64() * 1e3,
            encode_ms = encoded.as_secs_f64() * 1e3,
            total_ms = started.elapsed().as_secs_f64() * 1e3,
            "processed {}",
            source.display()
        );
        Ok(report)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ProcessError> {
    let create = |source| ProcessError::Create {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(create)?;
    if let Err(err) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(create(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Bgra8, ColorDepth, PixelBuffer};

    #[test]
    fn config_builders() {
        let config = ProcessorConfig::default()
            .with_threads(3)
            .with_rows_per_task(0)
            .with_strategy(Strategy::Scalar);
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.rows_per_task, None);
        assert_eq!(config.dispatch_options().rows_per_task.get(), 1);
    }

    #[test]
    fn zero_threads_is_a_pool_error() {
        let err = Processor::new(ProcessorConfig::default().with_threads(0)).unwrap_err();
        assert!(matches!(err, ProcessError::Pool(_)));
    }

    #[test]
    fn apply_filters_the_image() {
        let processor = Processor::new(ProcessorConfig::default().with_threads(2)).unwrap();
        let pixels = PixelBuffer::filled(
            4,
            3,
            Bgra8 {
                b: 10,
                g: 20,
                r: 30,
                a: 255,
            },
        )
        .unwrap();
        let mut image = Image::from_pixels(pixels, ColorDepth::Bgr24).unwrap();
        let report = processor
            .apply(&mut image, &Filter::brightness_contrast(5.0, 2.0))
            .unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(
            image.pixels().pixel(3, 2),
            Bgra8 {
                b: 25,
                g: 45,
                r: 65,
                a: 255
            }
        );
    }
}
