//! Per-run atomic counters
//!
//! Besides the queue itself, these are the only state shared by the
//! producer and every consumer of one strategy run. Latency samples are
//! counted per worker and never touch a shared counter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counters shared between the driver and the workers of one run
pub struct RunCounters {
    /// Data tokens enqueued by the producer
    pub tokens_enqueued: AtomicU64,

    /// Sentinels enqueued by the producer
    pub sentinels_enqueued: AtomicU64,

    /// Sentinels popped by consumers
    pub sentinels_observed: AtomicU64,

    /// Abort signal, raised only when a run fails before completion
    pub shutdown: AtomicBool,
}

impl RunCounters {
    pub fn new() -> Self {
        Self {
            tokens_enqueued: AtomicU64::new(0),
            sentinels_enqueued: AtomicU64::new(0),
            sentinels_observed: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Add a batch of data tokens (the producer reports once per run)
    #[inline]
    pub fn record_enqueued(&self, count: u64) {
        self.tokens_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sentinel_enqueued(&self) {
        self.sentinels_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sentinel_observed(&self) {
        self.sentinels_observed.fetch_add(1, Ordering::Relaxed);
    }

    /// Ask every worker of this run to stop at its next wake
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// (tokens enqueued, sentinels enqueued, sentinels observed)
    pub fn progress(&self) -> (u64, u64, u64) {
        (
            self.tokens_enqueued.load(Ordering::Relaxed),
            self.sentinels_enqueued.load(Ordering::Relaxed),
            self.sentinels_observed.load(Ordering::Relaxed),
        )
    }
}

impl Default for RunCounters {
    fn default() -> Self {
        Self::new()
    }
}
