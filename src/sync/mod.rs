//! Synchronization primitives
//!
//! A reentrant mutual-exclusion lock and a counting semaphore, the two
//! building blocks underneath the accounting ledger. Both are process-local
//! and block only the calling OS thread.

mod recursive;
mod semaphore;

pub use recursive::{RecursiveGuard, RecursiveLock};
pub use semaphore::{AcquireOutcome, Semaphore};
