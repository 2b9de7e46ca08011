//! The inter-stage buffer: a mutex + condvar protected FIFO with a
//! "ready"/"exhausted" flag pair, matching the synchronization discipline
//! described for every producer/consumer edge in the pipeline.
//!
//! Producers append under the lock, mark `ready`, and notify. Consumers
//! wait for `ready`, drain the *entire* queue into a private scratch
//! vector, clear `ready` unless the buffer is `exhausted` (in which case it
//! stays set so later waits return immediately), and release the lock
//! before doing anything expensive with the drained data.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct Inner<T> {
    queue: VecDeque<T>,
    ready: bool,
    exhausted: bool,
}

pub struct StageBuffer<T> {
    inner: Mutex<Inner<T>>,
    cv: Condvar,
}

impl<T> StageBuffer<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                ready: false,
                exhausted: false,
            }),
            cv: Condvar::new(),
        }
    }

    /// Append a batch of items and wake the consumer. Called by the
    /// producer only.
    pub fn push_batch(&self, items: impl IntoIterator<Item = T>) {
        let mut guard = self.inner.lock().unwrap();
        guard.queue.extend(items);
        guard.ready = true;
        self.cv.notify_one();
    }

    /// Mark the buffer as permanently exhausted. The producer has hit EOF
    /// (or upstream closed). Never cleared once set.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.exhausted = true;
        guard.ready = true;
        self.cv.notify_one();
    }

    /// Block until new items arrive or the buffer closes, then drain
    /// everything currently queued. Returns `(items, exhausted)`; an empty
    /// `items` with `exhausted = true` means upstream is fully drained and
    /// the caller should stop.
    pub fn wait_and_drain(&self) -> (Vec<T>, bool) {
        let mut guard = self
            .cv
            .wait_while(self.inner.lock().unwrap(), |g| !g.ready)
            .unwrap();

        let items: Vec<T> = guard.queue.drain(..).collect();
        let exhausted = guard.exhausted;
        if !exhausted {
            guard.ready = false;
        }
        (items, exhausted)
    }
}

impl<T> Default for StageBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
