//! Reentrant mutual-exclusion lock
//!
//! The owning thread may lock any number of times without self-deadlock;
//! the lock frees for other threads once every guard on the owning thread
//! has dropped.

use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

/// Ownership bookkeeping shared by all guards of one lock.
#[derive(Debug)]
struct Owner {
    holder: Option<ThreadId>,
    holds: usize,
}

/// Recursive mutual-exclusion lock owning its data.
///
/// A thread that already holds the lock acquires further levels
/// immediately; it must drop the same number of guards before another
/// thread can proceed. Guards hand out shared references only — a thread
/// holding twice has two live guards — so mutation goes through interior
/// mutability (the ledger pairs this with [`std::cell::RefCell`]).
pub struct RecursiveLock<T> {
    owner: Mutex<Owner>,
    freed: Condvar,
    data: UnsafeCell<T>,
}

// At most one thread at a time reaches `data`, possibly through several
// guards on that same thread.
unsafe impl<T: Send> Send for RecursiveLock<T> {}
unsafe impl<T: Send> Sync for RecursiveLock<T> {}

impl<T> RecursiveLock<T> {
    /// Create a lock owning `data`.
    pub fn new(data: T) -> Self {
        Self {
            owner: Mutex::new(Owner {
                holder: None,
                holds: 0,
            }),
            freed: Condvar::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Block until the calling thread owns the lock.
    pub fn lock(&self) -> RecursiveGuard<'_, T> {
        let me = thread::current().id();
        let mut owner = self.owner.lock();
        loop {
            match owner.holder {
                None => {
                    owner.holder = Some(me);
                    owner.holds = 1;
                    break;
                }
                Some(holder) if holder == me => {
                    owner.holds += 1;
                    break;
                }
                Some(_) => self.freed.wait(&mut owner),
            }
        }
        RecursiveGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Acquire without blocking; `None` when another thread holds the lock.
    pub fn try_lock(&self) -> Option<RecursiveGuard<'_, T>> {
        let me = thread::current().id();
        let mut owner = self.owner.lock();
        match owner.holder {
            None => {
                owner.holder = Some(me);
                owner.holds = 1;
            }
            Some(holder) if holder == me => owner.holds += 1,
            Some(_) => return None,
        }
        Some(RecursiveGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }

    /// Consume the lock and return its data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T> fmt::Debug for RecursiveLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveLock").finish_non_exhaustive()
    }
}

/// RAII guard releasing one level of ownership on drop.
pub struct RecursiveGuard<'a, T> {
    lock: &'a RecursiveLock<T>,
    // Hold counts are per-thread; a guard crossing threads would release
    // somebody else's level.
    _not_send: PhantomData<*const ()>,
}

impl<T> Deref for RecursiveGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // The guard's existence proves the calling thread owns the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for RecursiveGuard<'_, T> {
    fn drop(&mut self) {
        let mut owner = self.lock.owner.lock();
        owner.holds -= 1;
        if owner.holds == 0 {
            owner.holder = None;
            self.lock.freed.notify_one();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RecursiveGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
