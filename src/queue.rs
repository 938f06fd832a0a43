//! Unbounded FIFO shared between the dispatcher and the pool workers.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::error::PoolError;

/// Mutex-guarded queue with a condition variable signalling "not empty".
///
/// A poisoned lock is reported as
/// [`PoolError::SynchronizationPrimitiveFailure`] instead of panicking.
#[derive(Debug)]
pub struct SyncQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Append `item` and wake every waiting consumer.
    ///
    /// On failure the item is dropped.
    pub fn enqueue(&self, item: T) -> Result<(), PoolError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| PoolError::SynchronizationPrimitiveFailure("queue lock poisoned"))?;
        items.push_back(item);
        drop(items);
        self.not_empty.notify_all();
        Ok(())
    }

    /// Remove the oldest item, blocking while the queue is empty.
    pub fn dequeue(&self) -> Result<T, PoolError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| PoolError::SynchronizationPrimitiveFailure("queue lock poisoned"))?;
        loop {
            if let Some(item) = items.pop_front() {
                return Ok(item);
            }
            items = self
                .not_empty
                .wait(items)
                .map_err(|_| PoolError::SynchronizationPrimitiveFailure("queue wait poisoned"))?;
        }
    }

    /// Number of queued items at the time of the call.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything queued. Works on a poisoned lock too.
    pub fn drain(&self) -> Vec<T> {
        let mut items = match self.items.lock() {
            Ok(items) => items,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.drain(..).collect()
    }
}
