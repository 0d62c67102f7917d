//! The active recorder
//!
//! Counters, the live-identity table, and the append-only log, all behind
//! one reentrant guard. Anomalies are written into the log and mirrored to
//! the sink; only capacity exhaustion is returned as an error.

use std::cell::RefCell;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::sink::{Severity, Sink};
use crate::sync::RecursiveLock;
use crate::{LedgerConfig, LedgerError};

use super::{Site, Token, EMPTY_LOG};

/// Mutable ledger state, serialized by the guard.
#[derive(Debug)]
struct LedgerState {
    alloc_calls: u64,
    free_calls: u64,
    enabled: bool,
    log: String,
    live: HashSet<Token>,
}

impl LedgerState {
    fn push_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }
}

/// Debug-mode accounting ledger.
///
/// Records allocation/free calls and named resource acquisitions under an
/// opaque identity each, keeps the set of identities still outstanding,
/// and accumulates a line-per-event text log. Construction is the only way
/// into the active state; [`Ledger::quit`] consumes the ledger, so no
/// recording call can follow teardown.
#[derive(Debug)]
pub struct Ledger {
    guard: RecursiveLock<RefCell<LedgerState>>,
    sink: Sink,
    capacity: usize,
}

impl Ledger {
    /// Create an active ledger from `config`.
    pub fn new(config: LedgerConfig) -> Self {
        debug!(capacity = config.capacity, "ledger initialized");
        Self {
            guard: RecursiveLock::new(RefCell::new(LedgerState {
                alloc_calls: 0,
                free_calls: 0,
                enabled: config.enabled,
                log: String::new(),
                live: HashSet::new(),
            })),
            sink: config.sink,
            capacity: config.capacity,
        }
    }

    /// Record a heap allocation of `size` bytes under `identity`.
    ///
    /// The call site is captured automatically. A full live table is
    /// logged, reported through the sink, and returned as
    /// [`LedgerError::CapacityExceeded`]; the call is still counted.
    #[track_caller]
    pub fn record_alloc(&self, size: usize, identity: Token) -> Result<(), LedgerError> {
        self.record_alloc_at(size, identity, Site::caller())
    }

    /// [`record_alloc`](Self::record_alloc) with an explicit site.
    pub fn record_alloc_at(
        &self,
        size: usize,
        identity: Token,
        site: Site,
    ) -> Result<(), LedgerError> {
        self.record_acquire(identity, site, || {
            format!("{identity} - alloc: {size} bytes ({site})")
        })
    }

    /// Record the free of a previously recorded allocation.
    ///
    /// Freeing an identity the table does not hold appends an additional
    /// `free error` line and warns through the sink; it is reported, never
    /// fatal.
    #[track_caller]
    pub fn record_free(&self, identity: Token) {
        self.record_free_at(identity, Site::caller());
    }

    /// [`record_free`](Self::record_free) with an explicit site.
    pub fn record_free_at(&self, identity: Token, site: Site) {
        self.record_release(identity, site, || {
            format!("{identity} - free: memory freed ({site})")
        });
    }

    /// Record the acquisition of a named non-heap resource (thread,
    /// semaphore, socket). Same counters and table as heap records.
    #[track_caller]
    pub fn record_resource_alloc(&self, name: &str, identity: Token) -> Result<(), LedgerError> {
        self.record_resource_alloc_at(name, identity, Site::caller())
    }

    /// [`record_resource_alloc`](Self::record_resource_alloc) with an
    /// explicit site.
    pub fn record_resource_alloc_at(
        &self,
        name: &str,
        identity: Token,
        site: Site,
    ) -> Result<(), LedgerError> {
        self.record_acquire(identity, site, || {
            format!("{identity} - {name}: resource acquired ({site})")
        })
    }

    /// Record the release of a named resource.
    ///
    /// Untracked identities are reported exactly like heap frees.
    #[track_caller]
    pub fn record_resource_free(&self, name: &str, identity: Token) {
        self.record_resource_free_at(name, identity, Site::caller());
    }

    /// [`record_resource_free`](Self::record_resource_free) with an
    /// explicit site.
    pub fn record_resource_free_at(&self, name: &str, identity: Token, site: Site) {
        self.record_release(identity, site, || {
            format!("{identity} - {name}: resource released ({site})")
        });
    }

    /// Full accumulated log text, or [`EMPTY_LOG`](super::EMPTY_LOG) when
    /// nothing has been recorded. Safe to call concurrently with writers.
    pub fn dump(&self) -> String {
        let guard = self.guard.lock();
        let state = guard.borrow();
        if state.log.is_empty() {
            EMPTY_LOG.to_string()
        } else {
            state.log.clone()
        }
    }

    /// Number of allocation-record calls since construction.
    pub fn allocation_count(&self) -> Option<u64> {
        Some(self.guard.lock().borrow().alloc_calls)
    }

    /// Number of free-record calls since construction.
    pub fn free_count(&self) -> Option<u64> {
        Some(self.guard.lock().borrow().free_calls)
    }

    /// Number of identities currently outstanding.
    pub fn live_count(&self) -> usize {
        self.guard.lock().borrow().live.len()
    }

    /// Sorted snapshot of the outstanding identities.
    pub fn live_tokens(&self) -> Vec<Token> {
        let guard = self.guard.lock();
        let state = guard.borrow();
        let mut tokens: Vec<Token> = state.live.iter().copied().collect();
        tokens.sort_unstable();
        tokens
    }

    /// Resume recording.
    pub fn enable(&self) {
        self.guard.lock().borrow_mut().enabled = true;
    }

    /// Suspend recording; calls made while disabled leave no trace.
    pub fn disable(&self) {
        self.guard.lock().borrow_mut().enabled = false;
    }

    /// Whether recording is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.guard.lock().borrow().enabled
    }

    /// Tear the ledger down and return the accumulated log text.
    ///
    /// The returned text keeps post-shutdown dumps possible; the sentinel
    /// is returned when nothing was ever recorded.
    pub fn quit(self) -> String {
        debug!("ledger torn down");
        let state = self.guard.into_inner().into_inner();
        if state.log.is_empty() {
            EMPTY_LOG.to_string()
        } else {
            state.log
        }
    }

    fn record_acquire<F>(&self, identity: Token, site: Site, line: F) -> Result<(), LedgerError>
    where
        F: FnOnce() -> String,
    {
        let mut emits: Vec<(Severity, String)> = Vec::new();
        let mut full = false;
        {
            let guard = self.guard.lock();
            let mut state = guard.borrow_mut();
            if !state.enabled {
                return Ok(());
            }
            state.alloc_calls += 1;
            let line = line();
            state.push_line(&line);
            emits.push((Severity::Debug, line));
            if state.live.len() >= self.capacity && !state.live.contains(&identity) {
                full = true;
                let anomaly = format!("{identity} - alloc error: live table full ({site})");
                state.push_line(&anomaly);
                emits.push((Severity::Error, anomaly));
            } else {
                state.live.insert(identity);
            }
        }
        if full {
            warn!(identity = %identity, site = %site, capacity = self.capacity, "live table full");
        }
        // Guard released: the sink may run arbitrary caller code.
        for (severity, line) in emits {
            self.sink.emit(severity, Some(site), &line);
        }
        if full {
            Err(LedgerError::CapacityExceeded {
                capacity: self.capacity,
            })
        } else {
            Ok(())
        }
    }

    fn record_release<F>(&self, identity: Token, site: Site, line: F)
    where
        F: FnOnce() -> String,
    {
        let mut emits: Vec<(Severity, String)> = Vec::new();
        let mut untracked = false;
        {
            let guard = self.guard.lock();
            let mut state = guard.borrow_mut();
            if !state.enabled {
                return;
            }
            state.free_calls += 1;
            let line = line();
            state.push_line(&line);
            emits.push((Severity::Debug, line));
            if !state.live.remove(&identity) {
                untracked = true;
                let anomaly = format!("{identity} - free error: untracked identity ({site})");
                state.push_line(&anomaly);
                emits.push((Severity::Warning, anomaly));
            }
        }
        if untracked {
            warn!(identity = %identity, site = %site, "free of untracked identity");
        }
        for (severity, line) in emits {
            self.sink.emit(severity, Some(site), &line);
        }
    }
}
