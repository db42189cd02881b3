//! Blocking-wait strategy
//!
//! The consumer sleeps on a counting semaphore. A per-worker pending flag
//! coalesces bursts of `send()` calls: only the caller that flips the flag
//! from false to true posts the semaphore, so a producer running flat out
//! issues one post per drain cycle instead of one per token.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};

use super::queue::SharedQueue;
use super::worker::{Drain, DrainOutcome, DrainStrategy, Notifier};
use crate::utils::Result;

/// Counting semaphore
pub struct Semaphore {
    permits: Mutex<u64>,
    available: Condvar,
    /// Total posts, for observing coalescing
    posts: AtomicU64,
}

impl Semaphore {
    pub fn new(initial: u64) -> Self {
        Self {
            permits: Mutex::new(initial),
            available: Condvar::new(),
            posts: AtomicU64::new(0),
        }
    }

    pub fn post(&self) {
        {
            let mut permits = self.permits.lock();
            *permits += 1;
        }
        self.posts.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();
    }

    pub fn wait(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }
}

/// Coalesces redundant wake requests into a single semaphore post
pub struct PendingFlag {
    pending: CachePadded<AtomicBool>,
}

impl PendingFlag {
    pub fn new() -> Self {
        Self {
            pending: CachePadded::new(AtomicBool::new(false)),
        }
    }

    /// Producer side: false -> true. Returns true for the single winner.
    #[inline]
    pub fn try_raise(&self) -> bool {
        // Cheap read first; a raised flag means a wake is already on its way
        if self.pending.load(Ordering::Relaxed) {
            return false;
        }
        self.pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Consumer side: true -> false. Fails on a wake with nothing pending.
    #[inline]
    pub fn try_clear(&self) -> bool {
        self.pending
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for PendingFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle for a [`BlockingWait`] worker
pub struct BlockingNotifier {
    pending: Arc<PendingFlag>,
    semaphore: Arc<Semaphore>,
}

impl Notifier for BlockingNotifier {
    #[inline]
    fn notify(&self, queue: &SharedQueue) {
        queue.memory_fence();
        if self.pending.try_raise() {
            self.semaphore.post();
        }
    }
}

/// Consumer side of the blocking-wait strategy
pub struct BlockingWait {
    pending: Arc<PendingFlag>,
    semaphore: Arc<Semaphore>,
}

impl DrainStrategy for BlockingWait {
    type Sender = BlockingNotifier;

    const NAME: &'static str = "sema";

    fn create(_worker_id: usize) -> Result<(Self, Self::Sender)> {
        let pending = Arc::new(PendingFlag::new());
        let semaphore = Arc::new(Semaphore::new(0));
        let notifier = BlockingNotifier {
            pending: Arc::clone(&pending),
            semaphore: Arc::clone(&semaphore),
        };
        Ok((Self { pending, semaphore }, notifier))
    }

    fn run(self, drain: &mut Drain) -> Result<()> {
        loop {
            self.semaphore.wait();

            // Spurious or duplicate wake: nothing was pending
            if !self.pending.try_clear() {
                continue;
            }

            match drain.drain_once() {
                DrainOutcome::Sentinel => return drain.dump(),
                DrainOutcome::Empty if drain.is_shutdown() => return Ok(()),
                DrainOutcome::Empty => {}
            }
        }
    }
}

#[cfg(test)]
impl Semaphore {
    /// Take a permit without blocking
    fn try_wait(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            false
        } else {
            *permits -= 1;
            true
        }
    }

    fn posts(&self) -> u64 {
        self.posts.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
impl BlockingNotifier {
    /// Semaphore posts issued so far
    fn wake_posts(&self) -> u64 {
        self.semaphore.posts()
    }
}

#[cfg(test)]
impl PendingFlag {
    fn is_raised(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
