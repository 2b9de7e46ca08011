//! The single-phase "ready" barrier: the source blocks on it until every
//! downstream stage has finished loading its model. Never resets.

use std::sync::{Condvar, Mutex};

pub struct ReadyBarrier {
    target: usize,
    count: Mutex<usize>,
    cv: Condvar,
}

impl ReadyBarrier {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            count: Mutex::new(0),
            cv: Condvar::new(),
        }
    }

    /// Called exactly once by each stage after its model has loaded.
    pub fn signal_ready(&self) {
        let mut count = self.count.lock().unwrap();
        *count += 1;
        self.cv.notify_all();
    }

    /// Blocks until every stage has signalled readiness.
    pub fn wait_ready(&self) {
        let guard = self.count.lock().unwrap();
        let _ = self
            .cv
            .wait_while(guard, |count| *count < self.target)
            .unwrap();
    }
}
