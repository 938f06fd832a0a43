//! Fixed-size pool of named worker threads fed from a [`SyncQueue`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::PoolError;
use crate::queue::SyncQueue;

/// A unit of work for the pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Stop,
}

/// Worker threads that pull jobs until they receive a stop message.
///
/// Jobs that panic are logged and do not take their worker down. Dropping
/// the pool stops and joins every worker after the jobs already queued.
pub struct WorkerPool {
    queue: Arc<SyncQueue<Message>>,
    workers: Vec<JoinHandle<()>>,
    shut_down: bool,
}

impl WorkerPool {
    /// Spawn `threads` workers.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::InvalidSize);
        }

        let mut pool = Self {
            queue: Arc::new(SyncQueue::new()),
            workers: Vec::with_capacity(threads),
            shut_down: false,
        };

        for index in 0..threads {
            let queue = Arc::clone(&pool.queue);
            let spawned = thread::Builder::new()
                .name(format!("parbmp-worker-{index}"))
                .spawn(move || worker_loop(index, &queue));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(source) => {
                    // Stop the ones already running before reporting.
                    let _ = pool.shutdown();
                    return Err(PoolError::ThreadCreationFailure { index, source });
                }
            }
        }

        tracing::debug!(threads, "worker pool started");
        Ok(pool)
    }

    /// Two workers per logical core.
    pub fn with_default_size() -> Result<Self, PoolError> {
        Self::new(default_size())
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Jobs queued but not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue a job for any idle worker.
    pub fn execute<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.shut_down {
            return Err(PoolError::ShutDown);
        }
        self.queue.enqueue(Message::Run(Box::new(job)))
    }

    /// Stop every worker once the jobs queued before this call have run,
    /// then join them.
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&mut self) -> Result<(), PoolError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let mut result = Ok(());
        for _ in 0..self.workers.len() {
            if let Err(err) = self.queue.enqueue(Message::Stop) {
                // Workers see the same failure on dequeue and exit by themselves.
                result = Err(err);
                break;
            }
        }

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_owned();
            if handle.join().is_err() {
                tracing::error!(worker = %name, "worker thread panicked outside a job");
            }
        }

        tracing::debug!("worker pool stopped");
        result
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::error!(error = %err, "worker pool shutdown failed");
        }
    }
}

impl core::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.queue.len())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

/// `2 × logical cores`.
pub fn default_size() -> usize {
    num_cpus::get().max(1) * 2
}

fn worker_loop(index: usize, queue: &SyncQueue<Message>) {
    loop {
        match queue.dequeue() {
            Ok(Message::Run(job)) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!(worker = index, "job panicked");
                }
            }
            Ok(Message::Stop) => break,
            Err(err) => {
                let dropped = queue.drain().len();
                tracing::error!(worker = index, error = %err, dropped, "task queue failed, worker exiting");
                break;
            }
        }
    }
}
