//! Row-parallel filter application over a [`WorkerPool`].
//!
//! The image is cut into bands of consecutive rows, one task per band. Point
//! kernels rewrite their band in place. Window kernels read from a snapshot of
//! the buffer taken before any task starts, so a task never observes another
//! task's output. The dispatcher returns only after every task has finished
//! or been discarded.

mod completion;
#[allow(unsafe_code)]
mod rows;

use core::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use self::completion::{BandGuard, Completion};
use self::rows::{BandMut, Bands};
use crate::error::FilterError;
use crate::filter::{Filter, Kernel, PointKernel, Strategy, WindowKernel};
use crate::pixel::PixelBuffer;
use crate::pool::WorkerPool;

/// How the dispatching thread waits for the tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WaitMode {
    /// Busy-wait on the completion flag, yielding after a short spin.
    #[default]
    Spin,
    /// Sleep on a condition variable until the last task wakes it.
    Block,
}

/// Tuning for one dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchOptions {
    pub rows_per_task: NonZeroUsize,
    pub wait: WaitMode,
    pub strategy: Strategy,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            rows_per_task: NonZeroUsize::MIN,
            wait: WaitMode::default(),
            strategy: Strategy::default(),
        }
    }
}

/// What a dispatch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub tasks: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Apply `filter` to every row of `buffer` using the pool's workers.
///
/// Must not be called from inside a job running on `pool`: the calling thread
/// waits for the pool, so it cannot be one of its workers.
pub fn dispatch(
    pool: &WorkerPool,
    buffer: &mut PixelBuffer,
    filter: &Filter,
    options: &DispatchOptions,
) -> Result<DispatchReport, FilterError> {
    let kernel = filter.kernel(options.strategy)?;
    let report = dispatch_kernel(pool, buffer, &kernel, options.rows_per_task, options.wait)?;
    tracing::debug!(
        filter = filter.name(),
        tasks = report.tasks,
        rows = report.rows,
        elapsed_us = report.elapsed.as_micros() as u64,
        "dispatch finished"
    );
    Ok(report)
}

/// [`dispatch`] for an already-built kernel.
pub fn dispatch_kernel(
    pool: &WorkerPool,
    buffer: &mut PixelBuffer,
    kernel: &Kernel,
    rows_per_task: NonZeroUsize,
    wait: WaitMode,
) -> Result<DispatchReport, FilterError> {
    let started = Instant::now();
    let height = buffer.height();
    if height == 0 || buffer.width() == 0 {
        return Ok(DispatchReport {
            tasks: 0,
            rows: height,
            elapsed: started.elapsed(),
        });
    }

    let completion = Arc::new(Completion::new(height));
    let work = match kernel {
        Kernel::Point(kernel) => Work::Point(Arc::clone(kernel)),
        Kernel::Window(kernel) => Work::Window {
            kernel: Arc::clone(kernel),
            source: Arc::new(buffer.clone()),
        },
    };

    let mut tasks = 0;
    let mut enqueue_error = None;
    {
        // SAFETY: every band is moved into a task whose guard reports to
        // `completion`. Tasks report when they finish, panic or are dropped
        // unrun, and `completion.wait` below does not return before all rows
        // are reported. `buffer` stays mutably borrowed and untouched until
        // then, so no band outlives the borrow.
        #[allow(unsafe_code)]
        let mut bands = unsafe { Bands::new(buffer, rows_per_task) };

        for band in bands.by_ref() {
            let task = Task {
                work: work.clone(),
                guard: BandGuard::new(Arc::clone(&completion), band.len()),
                band,
            };
            // A rejected task is dropped inside `execute` and reports its rows as failed.
            if let Err(err) = pool.execute(move || task.run()) {
                enqueue_error = Some(err);
                break;
            }
            tasks += 1;
        }

        if enqueue_error.is_some() {
            completion.finish(bands.remaining_rows(), false);
        }
    }

    completion.wait(wait);

    if let Some(err) = enqueue_error {
        tracing::error!(error = %err, tasks, "dispatch aborted while queueing tasks");
        return Err(err.into());
    }
    let failed_rows = completion.failed_rows();
    if failed_rows > 0 {
        return Err(FilterError::TaskFailed {
            failed_rows,
            total_rows: height,
        });
    }

    Ok(DispatchReport {
        tasks,
        rows: height,
        elapsed: started.elapsed(),
    })
}

/// What a task runs. Window kernels always come with the snapshot they read.
#[derive(Clone)]
enum Work {
    Point(Arc<dyn PointKernel>),
    Window {
        kernel: Arc<dyn WindowKernel>,
        source: Arc<PixelBuffer>,
    },
}

struct Task {
    work: Work,
    band: BandMut,
    // Declared last so it reports after the other fields are released.
    guard: BandGuard,
}

impl Task {
    fn run(mut self) {
        match &self.work {
            Work::Point(kernel) => {
                for y in self.band.rows() {
                    kernel.apply_row(self.band.row_pixels_mut(y));
                }
            }
            Work::Window { kernel, source } => {
                for y in self.band.rows() {
                    kernel.apply_row(source, y, self.band.row_pixels_mut(y));
                }
            }
        }
        self.guard.mark_ran();
    }
}
