//! Orchestrator counters.
//!
//! Best-effort failures and degraded reads never reach the caller; they are
//! counted here and logged, so they stay observable.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of orchestrator activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AsideStats {
    /// Reads answered by the local tier
    pub local_hits: u64,
    /// Reads answered by the remote tier
    pub remote_hits: u64,
    /// Handler invocations, degraded ones included
    pub handler_calls: u64,
    /// Reads computed without write-back because the remote tier failed
    pub degraded_reads: u64,
    /// Local tier writes that failed and were skipped
    pub local_write_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct AsideCounters {
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    handler_calls: AtomicU64,
    degraded_reads: AtomicU64,
    local_write_failures: AtomicU64,
}

impl AsideCounters {
    pub fn local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handler_call(&self) {
        self.handler_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn degraded_read(&self) {
        self.degraded_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn local_write_failure(&self) {
        self.local_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AsideStats {
        AsideStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            handler_calls: self.handler_calls.load(Ordering::Relaxed),
            degraded_reads: self.degraded_reads.load(Ordering::Relaxed),
            local_write_failures: self.local_write_failures.load(Ordering::Relaxed),
        }
    }
}
