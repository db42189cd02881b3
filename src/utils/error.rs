//! Error types for wakeup-latency-bench

use std::io;
use thiserror::Error;

/// Top-level benchmark error
///
/// Every variant is fatal for the run that produced it. Spurious wakes
/// are handled inside the workers and never show up here.
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize {resource}: {source}")]
    ResourceInit {
        resource: &'static str,
        source: io::Error,
    },

    #[error("Queue capacity exceeded: capacity {capacity}, run needs {required} slots")]
    CapacityExceeded { capacity: usize, required: u64 },

    #[error("Sample count mismatch: expected {expected}, recorded {recorded}")]
    SampleMismatch { expected: u64, recorded: u64 },

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BenchmarkError {
    /// Wrap an OS-level failure while creating a worker resource
    pub fn resource(resource: &'static str, source: io::Error) -> Self {
        BenchmarkError::ResourceInit { resource, source }
    }
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message() {
        let err = BenchmarkError::CapacityExceeded {
            capacity: 16,
            required: 1004,
        };
        assert_eq!(
            err.to_string(),
            "Queue capacity exceeded: capacity 16, run needs 1004 slots"
        );
    }

    #[test]
    fn test_resource_init_message() {
        let err = BenchmarkError::resource(
            "event loop",
            io::Error::new(io::ErrorKind::Other, "too many open files"),
        );
        assert!(err.to_string().starts_with("Failed to initialize event loop"));
    }
}
