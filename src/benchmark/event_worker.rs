//! Event-loop strategy using mio
//!
//! Each worker runs a single-threaded `mio::Poll` loop on its own thread
//! with one registered handle: an inter-thread [`mio::Waker`].
//! - `send()` fences the queue, then wakes the loop
//! - the wake handler drains every available token
//! - on a sentinel the handler dumps stats and closes the wake handle;
//!   the loop exits once no open handle is left

use std::io::ErrorKind;

use mio::{Events, Poll, Token, Waker};
use tracing::warn;

use super::queue::SharedQueue;
use super::worker::{Drain, DrainOutcome, DrainStrategy, Notifier};
use crate::utils::{BenchmarkError, Result};

/// Token for the inter-thread wake handle
const WAKE_TOKEN: Token = Token(0);

/// Event capacity per poll; only the wake handle is ever registered
const EVENT_CAPACITY: usize = 16;

/// Producer handle for an [`EventLoop`] worker
pub struct LoopNotifier {
    waker: Waker,
}

impl Notifier for LoopNotifier {
    #[inline]
    fn notify(&self, queue: &SharedQueue) {
        queue.memory_fence();
        if let Err(e) = self.waker.wake() {
            warn!("Event loop wake failed: {}", e);
        }
    }
}

/// Consumer side of the event-loop strategy
pub struct EventLoop {
    poll: Poll,
    events: Events,
    /// Open handles keeping the loop alive (just the wake handle)
    active_handles: usize,
}

impl EventLoop {
    /// Run until every handle has been closed
    fn run_loop(&mut self, drain: &mut Drain) -> Result<()> {
        while self.active_handles > 0 {
            match self.poll.poll(&mut self.events, None) {
                Ok(()) => {}
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }

            let woken = self
                .events
                .iter()
                .any(|event| event.token() == WAKE_TOKEN);
            if woken {
                self.on_wake(drain)?;
            }
        }
        Ok(())
    }

    /// Wake handler: drain what is there, finalize on a sentinel
    fn on_wake(&mut self, drain: &mut Drain) -> Result<()> {
        match drain.drain_once() {
            DrainOutcome::Sentinel => {
                drain.dump()?;
                self.close_wake_handle();
            }
            DrainOutcome::Empty if drain.is_shutdown() => self.close_wake_handle(),
            DrainOutcome::Empty => {}
        }
        Ok(())
    }

    fn close_wake_handle(&mut self) {
        self.active_handles = self.active_handles.saturating_sub(1);
    }
}

impl DrainStrategy for EventLoop {
    type Sender = LoopNotifier;

    const NAME: &'static str = "loop";

    fn create(_worker_id: usize) -> Result<(Self, Self::Sender)> {
        let poll = Poll::new().map_err(|e| BenchmarkError::resource("event loop", e))?;
        let waker = Waker::new(poll.registry(), WAKE_TOKEN)
            .map_err(|e| BenchmarkError::resource("wake handle", e))?;

        Ok((
            Self {
                poll,
                events: Events::with_capacity(EVENT_CAPACITY),
                active_handles: 1,
            },
            LoopNotifier { waker },
        ))
    }

    fn run(mut self, drain: &mut Drain) -> Result<()> {
        self.run_loop(drain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_notify_wakes_poll() {
        let queue = SharedQueue::new(4).unwrap();
        let (mut event_loop, notifier) = EventLoop::create(0).unwrap();

        let handle = thread::spawn(move || {
            notifier.notify(&queue);
            notifier
        });
        let _notifier = handle.join().unwrap();

        event_loop
            .poll
            .poll(&mut event_loop.events, Some(Duration::from_secs(5)))
            .unwrap();
        assert!(event_loop
            .events
            .iter()
            .any(|event| event.token() == WAKE_TOKEN));
    }

    #[test]
    fn test_close_wake_handle() {
        let (mut event_loop, _notifier) = EventLoop::create(0).unwrap();
        assert_eq!(event_loop.active_handles, 1);
        event_loop.close_wake_handle();
        event_loop.close_wake_handle();
        assert_eq!(event_loop.active_handles, 0);
    }
}
