//! Configuration module

pub mod benchmark_config;
pub mod cli;

pub use benchmark_config::{
    BenchmarkConfig, DriverConfig, HistogramConfig, HIGHEST_TRACKABLE_NS, LOWEST_TRACKABLE_NS,
    NUM_ITERATIONS, NUM_WORKERS, QUEUE_CAPACITY, SIGNIFICANT_DIGITS,
};
pub use cli::{CliArgs, Strategy};
