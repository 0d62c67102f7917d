//! # Debug-Mode Resource Accounting
//!
//! A process-level ledger that records every heap allocation/free and
//! every named resource acquisition/release, detects frees of untracked
//! identities, and exposes a textual dump plus live counters for
//! diagnostics.
//!
//! The ledger is built on two synchronization primitives — a counting
//! [`Semaphore`] with timed acquisition and a reentrant [`RecursiveLock`]
//! — which serialize the ledger itself and can protect generic shared
//! containers. The guard must be reentrant because recording calls can
//! re-enter the ledger while it is already held (a tracked resource
//! released from code that is itself inside the ledger).
//!
//! ## Usage Example
//!
//! ```
//! use memledger::{Ledger, LedgerConfig, Token};
//!
//! let ledger = Ledger::new(LedgerConfig::default());
//! ledger.record_alloc(128, Token::new(0x1000)).unwrap();
//! ledger.record_free(Token::new(0x1000));
//! assert_eq!(ledger.allocation_count(), ledger.free_count());
//! let report = ledger.quit();
//! assert!(report.contains("alloc: 128 bytes"));
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - the primitives first, then everything that leans on them
pub mod sync;    // Reentrant lock and counting semaphore
pub mod ledger;  // Accounting store and recorder API
pub mod sink;    // Severity-tagged diagnostic output
pub mod timing;  // Monotonic elapsed-time records
pub mod util;    // Diagnostic helpers

// Re-exports for convenience
pub use ledger::{Ledger, ResourceGuard, Site, Token, TrackedSemaphore};
pub use sink::{Severity, Sink};
pub use sync::{AcquireOutcome, RecursiveLock, Semaphore};
pub use timing::TimeRecord;

use thiserror::Error;

/// Default capacity of the live-identity table.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Configuration for a [`Ledger`] instance.
#[derive(Debug)]
pub struct LedgerConfig {
    /// Maximum number of simultaneously outstanding identities.
    pub capacity: usize,

    /// Whether recording starts enabled.
    pub enabled: bool,

    /// Output medium for mirrored records and anomaly reports.
    pub sink: Sink,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            enabled: true,
            sink: Sink::Null,
        }
    }
}

impl LedgerConfig {
    /// Configuration with an explicit live-table capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Replace the output sink.
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }
}

/// Errors surfaced by the recorder.
///
/// Anomalies detected during recording (a free of an untracked identity)
/// are reported into the log rather than returned: the ledger's purpose is
/// post-hoc diagnosis, not enforcement. Only capacity exhaustion reaches
/// the caller as an error, so it cannot be silently dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The live-identity table reached its configured capacity.
    #[error("live table full: {capacity} identities outstanding")]
    CapacityExceeded {
        /// Configured table capacity.
        capacity: usize,
    },
}
