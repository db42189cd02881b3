//! Benchmark driver
//!
//! Runs one strategy end to end: starts the workers, produces timestamps
//! as fast as the queue takes them, dispatches notifications round-robin,
//! prints throughput, then terminates and joins every worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::blocking_worker::BlockingWait;
use super::busy_worker::BusyPoll;
use super::counters::RunCounters;
use super::event_worker::EventLoop;
use super::queue::{now_nanos, SharedQueue, SENTINEL};
use super::worker::{DrainStrategy, Worker, WorkerReport};
use crate::config::{DriverConfig, Strategy};
use crate::metrics::{format_count, format_throughput_line, throughput, ReportSink};
use crate::utils::{BenchmarkError, Result};

/// Outcome of one strategy run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Test name
    pub name: &'static str,
    /// Data tokens produced
    pub iterations: u64,
    /// Production phase duration
    pub elapsed: Duration,
    /// Tokens per second during production
    pub throughput: f64,
    /// One report per worker, in worker order
    pub workers: Vec<WorkerReport>,
}

impl RunSummary {
    /// Latency samples recorded across all workers
    pub fn total_samples(&self) -> u64 {
        self.workers.iter().map(|w| w.samples).sum()
    }

    /// Log a one-line digest
    pub fn log_summary(&self) {
        info!(
            "Test \"{}\" done: {} tokens in {:.3}s ({} tokens/s) across {} workers",
            self.name,
            format_count(self.iterations),
            self.elapsed.as_secs_f64(),
            format_count(self.throughput as u64),
            self.workers.len()
        );
    }
}

/// Drives a single strategy run over a fresh queue
pub struct BenchmarkDriver {
    config: DriverConfig,
    sink: ReportSink,
}

impl BenchmarkDriver {
    pub fn new(config: DriverConfig, sink: ReportSink) -> Self {
        Self { config, sink }
    }

    /// Run the given strategy
    pub fn run_strategy(&self, strategy: Strategy) -> Result<RunSummary> {
        match strategy {
            Strategy::BlockingWait => self.run::<BlockingWait>(),
            Strategy::BusyPoll => self.run::<BusyPoll>(),
            Strategy::EventLoop => self.run::<EventLoop>(),
        }
    }

    /// Run strategy `S` once
    ///
    /// The queue and counters live exactly as long as this call. On any
    /// failure the run's shutdown signal is raised before the workers are
    /// dropped, so every started thread is stopped and joined.
    pub fn run<S: DrainStrategy>(&self) -> Result<RunSummary> {
        self.validate()?;

        let queue = Arc::new(SharedQueue::new(self.config.queue_capacity)?);
        let counters = Arc::new(RunCounters::new());

        let mut workers: Vec<Worker<S>> = (0..self.config.workers)
            .map(|id| {
                Worker::new(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&counters),
                    self.sink.clone(),
                    self.config.histogram,
                )
            })
            .collect();

        info!(
            "Running test \"{}\": {} workers, {} tokens, capacity {}",
            S::NAME,
            self.config.workers,
            format_count(self.config.iterations),
            format_count(self.config.queue_capacity as u64)
        );

        let result = self.drive(&queue, &counters, &mut workers);
        if result.is_err() {
            counters.signal_shutdown();
        }
        drop(workers);

        if !queue.is_empty() {
            warn!(
                "Test \"{}\" aborted with {} entries left in the queue",
                S::NAME,
                format_count(queue.len() as u64)
            );
        }

        let (tokens, sentinels_sent, sentinels_seen) = counters.progress();
        debug!(
            "Test \"{}\" counters: tokens={} sentinels sent={} seen={}",
            S::NAME,
            tokens,
            sentinels_sent,
            sentinels_seen
        );

        result
    }

    fn validate(&self) -> Result<()> {
        if self.config.workers == 0 {
            return Err(BenchmarkError::Config(
                "At least one worker is required".to_string(),
            ));
        }
        if self.config.queue_capacity == 0 {
            return Err(BenchmarkError::Config(
                "Queue capacity must be at least 1".to_string(),
            ));
        }

        let required = self.config.required_capacity();
        if (self.config.queue_capacity as u64) < required {
            return Err(BenchmarkError::CapacityExceeded {
                capacity: self.config.queue_capacity,
                required,
            });
        }
        Ok(())
    }

    fn drive<S: DrainStrategy>(
        &self,
        queue: &SharedQueue,
        counters: &RunCounters,
        workers: &mut [Worker<S>],
    ) -> Result<RunSummary> {
        for worker in workers.iter_mut() {
            worker.init()?;
        }

        let num_workers = workers.len();
        let iterations = self.config.iterations;
        let mut index = 0usize;

        // Production: the notification is round-robin, the token is not
        let start = Instant::now();
        for _ in 0..iterations {
            self.enqueue(queue, now_nanos())?;
            workers[index % num_workers].send();
            index += 1;
        }
        let elapsed = start.elapsed();
        counters.record_enqueued(iterations);

        self.sink
            .write_line(&format_throughput_line(S::NAME, elapsed, iterations))?;

        // One sentinel per worker, dispatched like the data
        for _ in 0..num_workers {
            self.enqueue(queue, SENTINEL)?;
            counters.record_sentinel_enqueued();
            workers[index % num_workers].send();
            index += 1;
        }

        // Every worker still running drains at least once after the last
        // sentinel is in, so none can miss one taken on its behalf
        for worker in workers.iter() {
            worker.send();
        }

        let mut reports = Vec::with_capacity(num_workers);
        for worker in workers.iter_mut() {
            reports.push(worker.join()?);
        }

        let recorded: u64 = reports.iter().map(|r| r.samples).sum();
        if recorded != iterations {
            return Err(BenchmarkError::SampleMismatch {
                expected: iterations,
                recorded,
            });
        }

        Ok(RunSummary {
            name: S::NAME,
            iterations,
            elapsed,
            throughput: throughput(iterations, elapsed),
            workers: reports,
        })
    }

    #[inline]
    fn enqueue(&self, queue: &SharedQueue, token: u64) -> Result<()> {
        queue
            .enqueue(token)
            .map_err(|_| BenchmarkError::CapacityExceeded {
                capacity: queue.capacity(),
                required: self.config.required_capacity(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::worker::{Drain, DrainOutcome};
    use crate::benchmark::{SpinNotifier, WorkerState};
    use std::sync::mpsc;
    use std::thread;

    /// Generous upper bound for a single test run
    const RUN_BUDGET: Duration = Duration::from_secs(120);

    fn config(workers: usize, iterations: u64) -> DriverConfig {
        DriverConfig::new(workers, iterations, iterations as usize + workers + 64)
    }

    /// Run on a helper thread and fail if it does not finish in time
    fn run_bounded(strategy: Strategy, config: DriverConfig) -> (Result<RunSummary>, ReportSink) {
        let sink = ReportSink::buffer();
        let driver = BenchmarkDriver::new(config, sink.clone());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(driver.run_strategy(strategy));
        });
        let result = rx
            .recv_timeout(RUN_BUDGET)
            .unwrap_or_else(|_| panic!("{} run did not terminate in time", strategy));
        (result, sink)
    }

    fn assert_no_loss(strategy: Strategy) {
        for workers in [1, 4, 16] {
            for iterations in [0, 1, 10_000] {
                let (result, sink) = run_bounded(strategy, config(workers, iterations));
                let summary = result.unwrap();
                assert_eq!(
                    summary.total_samples(),
                    iterations,
                    "{} N={} M={}",
                    strategy,
                    workers,
                    iterations
                );
                assert_eq!(summary.workers.len(), workers);
                assert!(summary.workers.iter().all(|w| w.finished));
                assert_eq!(sink.contents().lines().count(), 1 + workers);
            }
        }
    }

    #[test]
    fn test_blocking_no_loss() {
        assert_no_loss(Strategy::BlockingWait);
    }

    #[test]
    fn test_busy_no_loss() {
        assert_no_loss(Strategy::BusyPoll);
    }

    #[test]
    fn test_event_loop_no_loss() {
        assert_no_loss(Strategy::EventLoop);
    }

    #[test]
    #[ignore = "ten million tokens per strategy; run with --ignored"]
    fn test_full_size_no_loss() {
        for strategy in Strategy::ALL {
            for workers in [1, 4, 16] {
                let (result, _) = run_bounded(strategy, config(workers, 10_000_000));
                assert_eq!(result.unwrap().total_samples(), 10_000_000);
            }
        }
    }

    #[test]
    fn test_report_lines() {
        for strategy in Strategy::ALL {
            let (result, sink) = run_bounded(strategy, DriverConfig::new(4, 1000, 2048));
            let summary = result.unwrap();
            assert_eq!(summary.name, strategy.as_str());

            let output = sink.contents();
            let lines: Vec<&str> = output.lines().collect();
            assert_eq!(lines.len(), 5);
            assert!(lines[0].starts_with(&format!("Test \"{}\": Elapsed: ", strategy)));
            assert!(lines[0].ends_with(" queues/second"));
            for line in &lines[1..] {
                assert!(line.starts_with("final stats (nanoseconds): min "));
                assert!(line.contains(" 99.9th "));
                assert!(line.contains(" stddev: "));
            }
        }
    }

    #[test]
    fn test_capacity_below_iterations_aborts() {
        for strategy in Strategy::ALL {
            let (result, sink) = run_bounded(strategy, DriverConfig::new(4, 1000, 16));
            assert!(matches!(
                result,
                Err(BenchmarkError::CapacityExceeded {
                    capacity: 16,
                    required: 1004
                })
            ));
            assert!(sink.contents().is_empty());
        }
    }

    #[test]
    fn test_capacity_must_hold_sentinels() {
        let (result, _) = run_bounded(Strategy::BusyPoll, DriverConfig::new(4, 1000, 1000));
        assert!(matches!(result, Err(BenchmarkError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let (result, _) = run_bounded(Strategy::EventLoop, DriverConfig::new(0, 10, 64));
        assert!(matches!(result, Err(BenchmarkError::Config(_))));
    }

    #[test]
    fn test_latencies_within_range() {
        let highest = crate::config::HIGHEST_TRACKABLE_NS;
        let (result, _) = run_bounded(Strategy::BlockingWait, config(4, 10_000));
        for report in result.unwrap().workers {
            if report.samples == 0 {
                continue;
            }
            assert!(report.summary.min >= 1);
            // 3 significant digits: bucket upper edge within 0.1% of the ceiling
            let ratio = report.summary.max as f64 / highest as f64;
            assert!(ratio <= 1.001, "max {} above ceiling", report.summary.max);
            assert!(report.summary.mean >= 1.0);
            assert!(report.summary.mean <= report.summary.max as f64);
        }
    }

    /// Spins like busy-poll, but worker 2 cannot get its wake primitives
    struct FailsAtWorkerTwo;

    impl DrainStrategy for FailsAtWorkerTwo {
        type Sender = SpinNotifier;

        const NAME: &'static str = "failing";

        fn create(worker_id: usize) -> Result<(Self, Self::Sender)> {
            if worker_id == 2 {
                return Err(BenchmarkError::resource(
                    "wake handle",
                    std::io::Error::new(std::io::ErrorKind::Other, "too many open files"),
                ));
            }
            Ok((FailsAtWorkerTwo, SpinNotifier))
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

    #[test]
    fn test_init_failure_stops_started_workers() {
        let sink = ReportSink::buffer();
        let driver = BenchmarkDriver::new(DriverConfig::new(4, 100, 200), sink.clone());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(driver.run::<FailsAtWorkerTwo>());
        });

        // Returning at all means workers 0 and 1 were stopped and joined
        let result = rx
            .recv_timeout(RUN_BUDGET)
            .unwrap_or_else(|_| panic!("aborted run did not return"));
        assert!(matches!(
            result,
            Err(BenchmarkError::ResourceInit {
                resource: "wake handle",
                ..
            })
        ));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_workers_destroyed_after_run() {
        let queue = Arc::new(SharedQueue::new(64).unwrap());
        let counters = Arc::new(RunCounters::new());
        let config = config(2, 10);
        let driver = BenchmarkDriver::new(config, ReportSink::buffer());
        let mut workers: Vec<Worker<EventLoop>> = (0..2)
            .map(|id| {
                Worker::new(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&counters),
                    ReportSink::buffer(),
                    config.histogram,
                )
            })
            .collect();

        let summary = driver.drive(&queue, &counters, &mut workers).unwrap();
        assert_eq!(summary.total_samples(), 10);
        assert!(workers.iter().all(|w| w.state() == WorkerState::Destroyed));
        assert_eq!(counters.progress(), (10, 2, 2));
    }
}
