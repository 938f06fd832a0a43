//! Per-dispatch completion barrier.

use std::hint;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use super::WaitMode;

/// Counts rows still in flight and flags when the count reaches zero.
///
/// Every task reports its band exactly once through [`Completion::finish`].
/// The report that brings the counter to zero publishes `done` with release
/// ordering; a waiter that observes `done` with acquire ordering therefore
/// sees every pixel written by every task.
#[derive(Debug)]
pub(crate) struct Completion {
    rows_left: AtomicUsize,
    failed_rows: AtomicUsize,
    done: AtomicBool,
    signal: Mutex<bool>,
    wake: Condvar,
}

/// Spins before falling back to `yield_now`.
const SPIN_LIMIT: u32 = 64;

impl Completion {
    pub(crate) fn new(rows: usize) -> Self {
        Self {
            rows_left: AtomicUsize::new(rows),
            failed_rows: AtomicUsize::new(0),
            done: AtomicBool::new(rows == 0),
            signal: Mutex::new(rows == 0),
            wake: Condvar::new(),
        }
    }

    /// Record that `rows` rows are finished. Returns `true` for the call that
    /// completed the dispatch.
    pub(crate) fn finish(&self, rows: usize, ok: bool) -> bool {
        if rows == 0 {
            return false;
        }
        if !ok {
            self.failed_rows.fetch_add(rows, Ordering::Relaxed);
        }
        let before = self.rows_left.fetch_sub(rows, Ordering::AcqRel);
        debug_assert!(before >= rows, "finished {rows} rows with only {before} left");
        if before != rows {
            return false;
        }

        let was_done = self.done.swap(true, Ordering::Release);
        debug_assert!(!was_done, "completion signalled twice");
        let mut signalled = self.signal.lock().unwrap_or_else(PoisonError::into_inner);
        *signalled = true;
        drop(signalled);
        self.wake.notify_all();
        true
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Block the calling thread until every row has been reported.
    pub(crate) fn wait(&self, mode: WaitMode) {
        match mode {
            WaitMode::Spin => {
                let mut spins = 0u32;
                while !self.done.load(Ordering::Acquire) {
                    if spins < SPIN_LIMIT {
                        spins += 1;
                        hint::spin_loop();
                    } else {
                        thread::yield_now();
                    }
                }
            }
            WaitMode::Block => {
                let mut signalled = self.signal.lock().unwrap_or_else(PoisonError::into_inner);
                while !*signalled {
                    signalled = self
                        .wake
                        .wait(signalled)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                drop(signalled);
                debug_assert!(self.is_done());
            }
        }
    }

    /// Rows reported as failed. Meaningful once [`Completion::is_done`].
    pub(crate) fn failed_rows(&self) -> usize {
        self.failed_rows.load(Ordering::Acquire)
    }
}

/// Reports a task's rows when dropped: as finished if the task marked itself
/// as run, as failed if it panicked or was dropped without running.
pub(crate) struct BandGuard {
    completion: Arc<Completion>,
    rows: usize,
    ran: bool,
}

impl BandGuard {
    pub(crate) fn new(completion: Arc<Completion>, rows: usize) -> Self {
        Self {
            completion,
            rows,
            ran: false,
        }
    }

    pub(crate) fn mark_ran(&mut self) {
        self.ran = true;
    }
}

impl Drop for BandGuard {
    fn drop(&mut self) {
        let ok = self.ran && !thread::panicking();
        self.completion.finish(self.rows, ok);
    }
}
