//! Generic benchmark worker
//!
//! A [`Worker`] owns one consumer thread, one latency recorder and the
//! wake primitives of its [`DrainStrategy`]. The strategy decides how the
//! consumer thread sleeps and how the producer wakes it; draining the
//! shared queue and recording latencies is common to all strategies and
//! lives in [`Drain`].
//!
//! ## Lifecycle
//!
//! `Created -> Initialized -> Running -> Finalizing -> Terminated -> Destroyed`
//!
//! - `init()` allocates the recorder and wake primitives, then spawns the thread
//! - the thread enters `Running` and drains until it pops a sentinel
//! - `Finalizing` covers the percentile dump
//! - `Terminated` once the drain loop has returned
//! - `Destroyed` once `join()` has collected the thread
//!
//! A worker dropped while its thread is still alive raises the run's
//! shutdown signal, wakes the thread and joins it, so no consumer thread
//! outlives the run that started it.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::counters::RunCounters;
use super::queue::{now_nanos, SharedQueue, SENTINEL};
use crate::config::HistogramConfig;
use crate::metrics::{format_summary_line, LatencyRecorder, LatencySummary, ReportSink};
use crate::utils::{BenchmarkError, Result};

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Created = 0,
    Initialized = 1,
    Running = 2,
    Finalizing = 3,
    Terminated = 4,
    Destroyed = 5,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Created,
            1 => WorkerState::Initialized,
            2 => WorkerState::Running,
            3 => WorkerState::Finalizing,
            4 => WorkerState::Terminated,
            _ => WorkerState::Destroyed,
        }
    }
}

/// Lifecycle state readable from any thread
struct WorkerStatus(AtomicU8);

impl WorkerStatus {
    fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Created as u8))
    }

    #[inline]
    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    #[inline]
    fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// How a drain pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Queue observed empty; more tokens may arrive later
    Empty,
    /// Popped a sentinel; this consumer must finalize and stop
    Sentinel,
}

/// Producer-side half of a strategy: the `send()` capability
pub trait Notifier: Send + Sync + 'static {
    /// Hint that new tokens may be available in `queue`
    fn notify(&self, queue: &SharedQueue);
}

/// Consumer wake-up discipline plugged into a [`Worker`]
pub trait DrainStrategy: Sized + Send + 'static {
    type Sender: Notifier;

    /// Test name printed in the throughput line
    const NAME: &'static str;

    /// Allocate the wake primitives for one worker
    fn create(worker_id: usize) -> Result<(Self, Self::Sender)>;

    /// Consumer thread body: drain until a sentinel (dump, then return)
    /// or until woken after the run's shutdown signal.
    fn run(self, drain: &mut Drain) -> Result<()>;
}

/// Consumer-thread context: queue access, recorder and report output
pub struct Drain {
    worker_id: usize,
    queue: Arc<SharedQueue>,
    counters: Arc<RunCounters>,
    status: Arc<WorkerStatus>,
    recorder: LatencyRecorder,
    sink: ReportSink,
    finished: bool,
}

impl Drain {
    /// Pop until the queue is empty or a sentinel shows up, recording the
    /// latency of every data token on the way
    #[inline]
    pub fn drain_once(&mut self) -> DrainOutcome {
        while let Some(token) = self.queue.dequeue() {
            if token == SENTINEL {
                self.finished = true;
                self.counters.record_sentinel_observed();
                self.status.set(WorkerState::Finalizing);
                return DrainOutcome::Sentinel;
            }
            self.record(now_nanos().saturating_sub(token));
        }
        DrainOutcome::Empty
    }

    #[inline]
    pub fn record(&mut self, latency_ns: u64) {
        self.recorder.record(latency_ns);
    }

    /// Write this worker's percentile line
    pub fn dump(&self) -> Result<()> {
        self.sink
            .write_line(&format_summary_line(&self.recorder.summary()))?;
        Ok(())
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.counters.is_shutdown()
    }

    fn into_report(self) -> WorkerReport {
        WorkerReport {
            worker_id: self.worker_id,
            samples: self.recorder.len(),
            summary: self.recorder.summary(),
            finished: self.finished,
        }
    }
}

/// Result collected by [`Worker::join`]
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Latency samples recorded by this worker
    pub samples: u64,
    pub summary: LatencySummary,
    /// Whether the worker stopped on a sentinel (false after an abort)
    pub finished: bool,
}

/// One consumer thread driven by strategy `S`
pub struct Worker<S: DrainStrategy> {
    id: usize,
    queue: Arc<SharedQueue>,
    counters: Arc<RunCounters>,
    sink: ReportSink,
    histogram: HistogramConfig,
    status: Arc<WorkerStatus>,
    notifier: Option<S::Sender>,
    thread: Option<JoinHandle<Result<WorkerReport>>>,
    _strategy: PhantomData<fn() -> S>,
}

impl<S: DrainStrategy> Worker<S> {
    pub fn new(
        id: usize,
        queue: Arc<SharedQueue>,
        counters: Arc<RunCounters>,
        sink: ReportSink,
        histogram: HistogramConfig,
    ) -> Self {
        Self {
            id,
            queue,
            counters,
            sink,
            histogram,
            status: Arc::new(WorkerStatus::new()),
            notifier: None,
            thread: None,
            _strategy: PhantomData,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.status.get()
    }

    /// Allocate resources and start the consumer thread
    ///
    /// Resources created before a failure are released when they go out
    /// of scope; nothing is retried.
    pub fn init(&mut self) -> Result<()> {
        if self.state() != WorkerState::Created {
            return Err(BenchmarkError::Config(format!(
                "Worker {} initialized twice",
                self.id
            )));
        }

        let recorder = LatencyRecorder::new(&self.histogram)?;
        let (strategy, notifier) = S::create(self.id)?;
        self.status.set(WorkerState::Initialized);

        let mut drain = Drain {
            worker_id: self.id,
            queue: Arc::clone(&self.queue),
            counters: Arc::clone(&self.counters),
            status: Arc::clone(&self.status),
            recorder,
            sink: self.sink.clone(),
            finished: false,
        };

        let handle = thread::Builder::new()
            .name(format!("{}-worker-{}", S::NAME, self.id))
            .spawn(move || {
                drain.status.set(WorkerState::Running);
                let result = strategy.run(&mut drain);
                drain.status.set(WorkerState::Terminated);
                result.map(|()| drain.into_report())
            })
            .map_err(|e| BenchmarkError::resource("worker thread", e))?;

        self.notifier = Some(notifier);
        self.thread = Some(handle);
        debug!("Worker {} ({}) started", self.id, S::NAME);
        Ok(())
    }

    /// Tell the worker new tokens may be available
    #[inline]
    pub fn send(&self) {
        if let Some(ref notifier) = self.notifier {
            notifier.notify(&self.queue);
        }
    }

    /// Block until the consumer thread has finished
    pub fn join(&mut self) -> Result<WorkerReport> {
        let handle = self.thread.take().ok_or_else(|| {
            BenchmarkError::Config(format!("Worker {} was never started", self.id))
        })?;

        let result = handle
            .join()
            .map_err(|_| BenchmarkError::Worker(format!("worker {} panicked", self.id)));
        self.status.set(WorkerState::Destroyed);
        debug!("Worker {} ({}) joined", self.id, S::NAME);
        result?
    }
}

impl<S: DrainStrategy> Drop for Worker<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.counters.signal_shutdown();
            self.send();
            if handle.join().is_err() {
                warn!("Worker {} panicked during shutdown", self.id);
            }
            self.status.set(WorkerState::Destroyed);
        }
    }
}
