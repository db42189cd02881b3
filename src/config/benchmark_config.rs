//! Benchmark configuration derived from CLI arguments and build-time constants

use super::cli::{CliArgs, Strategy};

/// Number of consumer threads per strategy run
pub const NUM_WORKERS: usize = 4;

/// Tokens produced per strategy run
pub const NUM_ITERATIONS: u64 = 10_000_000;

/// Shared queue capacity (must hold every token plus one sentinel per worker)
pub const QUEUE_CAPACITY: usize = 16 * 1024 * 1024;

/// Smallest latency the histograms track (1 ns)
pub const LOWEST_TRACKABLE_NS: u64 = 1;

/// Largest latency the histograms track (1 hour)
pub const HIGHEST_TRACKABLE_NS: u64 = 3_600 * 1_000 * 1_000 * 1_000;

/// Histogram precision
pub const SIGNIFICANT_DIGITS: u8 = 3;

/// Latency histogram bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramConfig {
    pub lowest_ns: u64,
    pub highest_ns: u64,
    pub significant_digits: u8,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            lowest_ns: LOWEST_TRACKABLE_NS,
            highest_ns: HIGHEST_TRACKABLE_NS,
            significant_digits: SIGNIFICANT_DIGITS,
        }
    }
}

/// Parameters for a single strategy run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub workers: usize,
    pub iterations: u64,
    pub queue_capacity: usize,
    pub histogram: HistogramConfig,
}

impl DriverConfig {
    pub fn new(workers: usize, iterations: u64, queue_capacity: usize) -> Self {
        Self {
            workers,
            iterations,
            queue_capacity,
            histogram: HistogramConfig::default(),
        }
    }

    /// Queue slots one run needs: every token plus one sentinel per worker
    pub fn required_capacity(&self) -> u64 {
        self.iterations + self.workers as u64
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(NUM_WORKERS, NUM_ITERATIONS, QUEUE_CAPACITY)
    }
}

/// Complete benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub driver: DriverConfig,
    pub tests: Vec<Strategy>,
    /// Seed for the strategy order; `None` draws a random one
    pub seed: Option<u64>,
}

impl BenchmarkConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        args.validate()?;

        Ok(Self {
            driver: DriverConfig::default(),
            tests: args.tests.clone(),
            seed: if args.seed == 0 { None } else { Some(args.seed) },
        })
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            tests: Strategy::ALL.to_vec(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_time_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.iterations, 10_000_000);
        assert_eq!(config.queue_capacity, 16 * 1024 * 1024);
        assert!(config.queue_capacity as u64 >= config.required_capacity());
        assert_eq!(config.histogram.highest_ns, 3_600_000_000_000);
    }

    #[test]
    fn test_from_cli() {
        let args = CliArgs::parse_from(["test", "--seed", "42", "-t", "busy"]);
        let config = BenchmarkConfig::from_cli(&args).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tests, vec![Strategy::BusyPoll]);
        assert_eq!(config.driver, DriverConfig::default());
    }

    #[test]
    fn test_zero_seed_is_random() {
        let args = CliArgs::parse_from(["test"]);
        let config = BenchmarkConfig::from_cli(&args).unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_from_cli_rejects_invalid() {
        let args = CliArgs::parse_from(["test", "-v", "-q"]);
        assert!(BenchmarkConfig::from_cli(&args).is_err());
    }
}
