//! Inert recorder compiled without the `recording` feature
//!
//! Same API surface as the active recorder so callers need no
//! special-casing: records are no-ops, counters are unavailable, and
//! `dump` returns a fixed notice.

use crate::{LedgerConfig, LedgerError};

use super::{Site, Token, NO_RECORDING};

/// Inert ledger; every operation is a no-op.
#[derive(Debug)]
pub struct Ledger;

impl Ledger {
    /// Create an inert ledger; `config` is accepted and ignored.
    pub fn new(_config: LedgerConfig) -> Self {
        Self
    }

    /// No-op.
    #[track_caller]
    pub fn record_alloc(&self, size: usize, identity: Token) -> Result<(), LedgerError> {
        self.record_alloc_at(size, identity, Site::caller())
    }

    /// No-op.
    pub fn record_alloc_at(
        &self,
        _size: usize,
        _identity: Token,
        _site: Site,
    ) -> Result<(), LedgerError> {
        Ok(())
    }

    /// No-op.
    #[track_caller]
    pub fn record_free(&self, identity: Token) {
        self.record_free_at(identity, Site::caller());
    }

    /// No-op.
    pub fn record_free_at(&self, _identity: Token, _site: Site) {}

    /// No-op.
    #[track_caller]
    pub fn record_resource_alloc(&self, name: &str, identity: Token) -> Result<(), LedgerError> {
        self.record_resource_alloc_at(name, identity, Site::caller())
    }

    /// No-op.
    pub fn record_resource_alloc_at(
        &self,
        _name: &str,
        _identity: Token,
        _site: Site,
    ) -> Result<(), LedgerError> {
        Ok(())
    }

    /// No-op.
    #[track_caller]
    pub fn record_resource_free(&self, name: &str, identity: Token) {
        self.record_resource_free_at(name, identity, Site::caller());
    }

    /// No-op.
    pub fn record_resource_free_at(&self, _name: &str, _identity: Token, _site: Site) {}

    /// Fixed [`NO_RECORDING`](super::NO_RECORDING) notice.
    pub fn dump(&self) -> String {
        NO_RECORDING.to_string()
    }

    /// Unavailable in this configuration.
    pub fn allocation_count(&self) -> Option<u64> {
        None
    }

    /// Unavailable in this configuration.
    pub fn free_count(&self) -> Option<u64> {
        None
    }

    /// Always zero.
    pub fn live_count(&self) -> usize {
        0
    }

    /// Always empty.
    pub fn live_tokens(&self) -> Vec<Token> {
        Vec::new()
    }

    /// No-op.
    pub fn enable(&self) {}

    /// No-op.
    pub fn disable(&self) {}

    /// Always false.
    pub fn is_enabled(&self) -> bool {
        false
    }

    /// Fixed [`NO_RECORDING`](super::NO_RECORDING) notice.
    pub fn quit(self) -> String {
        NO_RECORDING.to_string()
    }
}
