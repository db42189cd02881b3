//! Shared token queue
//!
//! One bounded MPMC queue per strategy run. The producer pushes
//! timestamps, every consumer pops from the same instance; it is not a
//! per-consumer mailbox.

use std::sync::atomic::{fence, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use crossbeam_queue::ArrayQueue;

use crate::utils::{BenchmarkError, Result};

/// Reserved token telling the consumer that pops it to terminate
pub const SENTINEL: u64 = u64::MAX;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic nanoseconds since the first call in this process
#[inline]
pub fn now_nanos() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Returned by [`SharedQueue::enqueue`] when every slot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull(pub u64);

/// Bounded multi-producer/multi-consumer queue of 64-bit tokens
pub struct SharedQueue {
    inner: ArrayQueue<u64>,
}

impl SharedQueue {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BenchmarkError::Config(
                "Queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            inner: ArrayQueue::new(capacity),
        })
    }

    /// Non-blocking push; hands the token back when the queue is full
    #[inline]
    pub fn enqueue(&self, token: u64) -> std::result::Result<(), QueueFull> {
        self.inner.push(token).map_err(QueueFull)
    }

    /// Non-blocking pop of at most one token
    #[inline]
    pub fn dequeue(&self) -> Option<u64> {
        self.inner.pop()
    }

    /// Publish every enqueue made by this thread before any wake that follows
    #[inline]
    pub fn memory_fence(&self) {
        fence(Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}
