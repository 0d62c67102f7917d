//! RAII resource registration
//!
//! Pairs a resource-acquisition record with its release record through
//! drop, so a tracked resource cannot forget to deregister. Dropping a
//! guard re-enters the ledger, which is why the guard lock is recursive.

use std::ops::Deref;
use std::sync::Arc;

use crate::sync::Semaphore;

use super::{Ledger, Site, Token};

/// Records a named resource acquisition now and its release on drop.
///
/// The release is stamped with the acquisition site so both lines of a
/// pair point at the owner. A full live table at acquisition is already
/// recorded as an anomaly; the guard is still returned so the release can
/// pair with it.
#[derive(Debug)]
pub struct ResourceGuard {
    ledger: Arc<Ledger>,
    name: String,
    identity: Token,
    site: Site,
}

impl ResourceGuard {
    /// Register `identity` under `name` with `ledger`.
    #[track_caller]
    pub fn new(ledger: Arc<Ledger>, name: impl Into<String>, identity: Token) -> Self {
        let site = Site::caller();
        let name = name.into();
        let _ = ledger.record_resource_alloc_at(&name, identity, site);
        Self {
            ledger,
            name,
            identity,
            site,
        }
    }

    /// Identity this guard registered.
    pub fn identity(&self) -> Token {
        self.identity
    }

    /// Resource name this guard registered under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.ledger
            .record_resource_free_at(&self.name, self.identity, self.site);
    }
}

/// Counting semaphore registered with a ledger for its lifetime.
///
/// The semaphore is boxed so its stable heap address can serve as its
/// identity.
#[derive(Debug)]
pub struct TrackedSemaphore {
    sem: Box<Semaphore>,
    _guard: ResourceGuard,
}

impl TrackedSemaphore {
    /// Create a semaphore with `initial` permits, registered under the
    /// name `"semaphore"`.
    #[track_caller]
    pub fn new(ledger: Arc<Ledger>, initial: usize) -> Self {
        let sem = Box::new(Semaphore::new(initial));
        let guard = ResourceGuard::new(ledger, "semaphore", Token::from_ref(&*sem));
        Self { sem, _guard: guard }
    }
}

impl Deref for TrackedSemaphore {
    type Target = Semaphore;

    fn deref(&self) -> &Semaphore {
        &self.sem
    }
}
