//! Benchmark driver and workers
//!
//! This module provides the multi-threaded benchmark execution system:
//! - SharedQueue: the bounded MPMC token queue shared by one run
//! - RunCounters: atomic state shared by producer and consumers
//! - Worker: generic consumer thread with a pluggable DrainStrategy
//! - BlockingWait / BusyPoll / EventLoop: the three wake-up strategies
//! - BenchmarkDriver: produces tokens and runs one strategy
//! - StrategySuite: runs the strategies in shuffled order

pub mod blocking_worker;
pub mod busy_worker;
pub mod counters;
pub mod driver;
pub mod event_worker;
pub mod queue;
pub mod suite;
pub mod worker;

pub use blocking_worker::{BlockingNotifier, BlockingWait, PendingFlag, Semaphore};
pub use busy_worker::{BusyPoll, SpinNotifier};
pub use counters::RunCounters;
pub use driver::{BenchmarkDriver, RunSummary};
pub use event_worker::{EventLoop, LoopNotifier};
pub use queue::{now_nanos, QueueFull, SharedQueue, SENTINEL};
pub use suite::StrategySuite;
pub use worker::{Drain, DrainOutcome, DrainStrategy, Notifier, Worker, WorkerReport, WorkerState};
