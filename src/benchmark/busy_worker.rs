//! Busy-poll strategy
//!
//! The consumer never sleeps: it pops in a tight loop until it sees a
//! sentinel. `send()` does nothing. Lowest wake latency, one core burned
//! per worker.

use super::queue::SharedQueue;
use super::worker::{Drain, DrainOutcome, DrainStrategy, Notifier};
use crate::utils::Result;

/// Producer handle for a [`BusyPoll`] worker (no-op)
pub struct SpinNotifier;

impl Notifier for SpinNotifier {
    #[inline]
    fn notify(&self, _queue: &SharedQueue) {}
}

/// Consumer side of the busy-poll strategy
pub struct BusyPoll;

impl DrainStrategy for BusyPoll {
    type Sender = SpinNotifier;

    const NAME: &'static str = "busy";

    fn create(_worker_id: usize) -> Result<(Self, Self::Sender)> {
        Ok((BusyPoll, SpinNotifier))
    }

    fn run(self, drain: &mut Drain) -> Result<()> {
        loop {
            match drain.drain_once() {
                DrainOutcome::Sentinel => return drain.dump(),
                DrainOutcome::Empty if drain.is_shutdown() => return Ok(()),
                DrainOutcome::Empty => std::hint::spin_loop(),
            }
        }
    }
}
