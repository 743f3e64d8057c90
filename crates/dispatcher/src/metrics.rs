//! Per-dispatcher counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single dispatcher instance
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Cycles that ran to completion
    cycles_completed: AtomicU64,
    /// Cycles aborted by an error
    cycles_failed: AtomicU64,
    /// Callback invocations, all paths
    callbacks_invoked: AtomicU64,
    /// Invocations pulled forward by `wait_for`
    deferred_invocations: AtomicU64,
    /// Protocol violations rejected at the API boundary
    rejected_calls: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub fn inc_cycles_completed(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cycles_failed(&self) -> u64 {
        self.cycles_failed.load(Ordering::Relaxed)
    }

    pub fn inc_cycles_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn callbacks_invoked(&self) -> u64 {
        self.callbacks_invoked.load(Ordering::Relaxed)
    }

    /// Count one invocation; `deferred` when reached through `wait_for`
    pub fn inc_callbacks_invoked(&self, deferred: bool) {
        self.callbacks_invoked.fetch_add(1, Ordering::Relaxed);
        if deferred {
            self.deferred_invocations.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn deferred_invocations(&self) -> u64 {
        self.deferred_invocations.load(Ordering::Relaxed)
    }

    pub fn rejected_calls(&self) -> u64 {
        self.rejected_calls.load(Ordering::Relaxed)
    }

    pub fn inc_rejected_calls(&self) {
        self.rejected_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_completed: self.cycles_completed(),
            cycles_failed: self.cycles_failed(),
            callbacks_invoked: self.callbacks_invoked(),
            deferred_invocations: self.deferred_invocations(),
            rejected_calls: self.rejected_calls(),
        }
    }
}

/// Snapshot of dispatcher counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub callbacks_invoked: u64,
    pub deferred_invocations: u64,
    pub rejected_calls: u64,
}
