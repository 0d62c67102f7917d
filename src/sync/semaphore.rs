//! Counting semaphore
//!
//! Process-local, not shared across processes. Blocking, non-blocking, and
//! timed acquisition; timed waits use the native condvar deadline instead
//! of a poll loop, keeping the acquired/timed-out outcome contract.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Outcome of a timed acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// A permit became available before the deadline and was consumed.
    Acquired,
    /// The deadline passed with the count at zero; nothing was consumed.
    TimedOut,
}

/// Counting semaphore.
#[derive(Debug)]
pub struct Semaphore {
    count: Mutex<usize>,
    posted: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `initial` permits.
    pub fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            posted: Condvar::new(),
        }
    }

    /// Block until a permit is available, then consume it.
    pub fn acquire(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.posted.wait(&mut count);
        }
        *count -= 1;
    }

    /// Consume a permit if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let mut count = self.count.lock();
        if *count > 0 {
            *count -= 1;
            true
        } else {
            false
        }
    }

    /// Block until a permit is available or `timeout` elapses.
    pub fn acquire_timeout(&self, timeout: Duration) -> AcquireOutcome {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count == 0 {
            if self.posted.wait_until(&mut count, deadline).timed_out() {
                // A release can race the deadline; honor it if it landed.
                if *count > 0 {
                    break;
                }
                return AcquireOutcome::TimedOut;
            }
        }
        *count -= 1;
        AcquireOutcome::Acquired
    }

    /// Return one permit, waking at most one blocked waiter.
    pub fn release(&self) {
        let mut count = self.count.lock();
        *count += 1;
        self.posted.notify_one();
    }

    /// Snapshot of the currently available permits.
    pub fn available(&self) -> usize {
        *self.count.lock()
    }
}
