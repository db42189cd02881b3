//! Command-line argument parsing
//!
//! Worker count, iteration count and queue capacity are build-time
//! constants (see [`super::benchmark_config`]). The command line only
//! chooses which strategies run, the ordering seed and log verbosity.

use clap::{Parser, ValueEnum};

/// Wake-up strategy latency benchmark over a shared MPMC queue
#[derive(Parser, Debug, Clone)]
#[command(name = "wakeup-latency-bench")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Strategies to run (shuffled before running)
    #[arg(
        short = 't',
        long = "tests",
        value_enum,
        value_delimiter = ',',
        default_values_t = [Strategy::BlockingWait, Strategy::BusyPoll, Strategy::EventLoop]
    )]
    pub tests: Vec<Strategy>,

    /// Seed for the strategy order (0 = random seed)
    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,

    /// Verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

/// Consumer wake-up strategy
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Semaphore wait with a coalescing pending flag
    #[value(name = "sema")]
    BlockingWait,
    /// Spin on the queue without ever sleeping
    #[value(name = "busy")]
    BusyPoll,
    /// Single-threaded event loop woken by an inter-thread waker
    #[value(name = "loop")]
    EventLoop,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::BlockingWait, Strategy::BusyPoll, Strategy::EventLoop];

    /// Test name used in the throughput line
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BlockingWait => "sema",
            Strategy::BusyPoll => "busy",
            Strategy::EventLoop => "loop",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        if self.tests.is_empty() {
            return Err("--tests must name at least one strategy".to_string());
        }

        let mut seen = Vec::with_capacity(self.tests.len());
        for test in &self.tests {
            if seen.contains(test) {
                return Err(format!("Strategy '{}' listed more than once", test));
            }
            seen.push(*test);
        }

        Ok(())
    }
}
