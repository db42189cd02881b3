//! Per-worker latency recorder
//!
//! Thin wrapper over an HDR histogram. Each worker owns exactly one
//! recorder and only that worker's thread ever writes to it.

use std::io;

use hdrhistogram::Histogram;

use crate::config::HistogramConfig;
use crate::utils::{BenchmarkError, Result};

/// Percentile summary of one recorder, all values in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatencySummary {
    pub samples: u64,
    pub min: u64,
    pub max: u64,
    pub median: u64,
    pub p75: u64,
    pub p95: u64,
    pub p98: u64,
    pub p99: u64,
    pub p999: u64,
    pub mean: f64,
    pub stddev: f64,
}

/// Nanosecond latency histogram
pub struct LatencyRecorder {
    histogram: Histogram<u64>,
    lowest: u64,
    highest: u64,
}

impl LatencyRecorder {
    pub fn new(config: &HistogramConfig) -> Result<Self> {
        let histogram = Histogram::new_with_bounds(
            config.lowest_ns,
            config.highest_ns,
            config.significant_digits,
        )
        .map_err(|e| {
            BenchmarkError::resource(
                "latency histogram",
                io::Error::new(io::ErrorKind::InvalidInput, format!("{:?}", e)),
            )
        })?;
        Ok(Self {
            histogram,
            lowest: config.lowest_ns,
            highest: config.highest_ns,
        })
    }

    /// Record one sample, clipped into the trackable range
    #[inline]
    pub fn record(&mut self, value_ns: u64) {
        self.histogram
            .saturating_record(value_ns.clamp(self.lowest, self.highest));
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }

    pub fn percentile(&self, p: f64) -> u64 {
        self.histogram.value_at_percentile(p)
    }

    pub fn min(&self) -> u64 {
        self.histogram.min()
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    pub fn stddev(&self) -> f64 {
        self.histogram.stdev()
    }

    /// Snapshot the distribution; an empty recorder yields all zeros
    pub fn summary(&self) -> LatencySummary {
        if self.is_empty() {
            return LatencySummary::default();
        }

        LatencySummary {
            samples: self.len(),
            min: self.min(),
            max: self.max(),
            median: self.percentile(50.0),
            p75: self.percentile(75.0),
            p95: self.percentile(95.0),
            p98: self.percentile(98.0),
            p99: self.percentile(99.0),
            p999: self.percentile(99.9),
            mean: self.mean(),
            stddev: self.stddev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HIGHEST_TRACKABLE_NS;

    fn recorder() -> LatencyRecorder {
        LatencyRecorder::new(&HistogramConfig::default()).unwrap()
    }

    #[test]
    fn test_percentiles() {
        let mut rec = recorder();
        for _ in 0..100 {
            rec.record(1_000);
        }
        for _ in 0..10 {
            rec.record(100_000);
        }

        let summary = rec.summary();
        assert_eq!(summary.samples, 110);
        assert!(summary.median < 1_100);
        assert!(summary.p99 >= 99_000);
        assert!(summary.min <= 1_000);
        assert!(summary.max >= 100_000);
        assert!(summary.mean > 1_000.0 && summary.mean < 100_000.0);
    }

    #[test]
    fn test_values_above_ceiling_are_clipped() {
        let mut rec = recorder();
        rec.record(u64::MAX);
        rec.record(10 * HIGHEST_TRACKABLE_NS);

        assert_eq!(rec.len(), 2);
        let ratio = rec.max() as f64 / HIGHEST_TRACKABLE_NS as f64;
        assert!(ratio > 0.999 && ratio < 1.001, "max ratio {}", ratio);
    }

    #[test]
    fn test_zero_is_clipped_not_dropped() {
        let mut rec = recorder();
        rec.record(0);
        assert_eq!(rec.len(), 1);
        assert!(rec.max() <= 1);
    }

    #[test]
    fn test_empty_summary() {
        let rec = recorder();
        assert!(rec.is_empty());
        assert_eq!(rec.summary(), LatencySummary::default());
    }

    #[test]
    fn test_invalid_bounds() {
        let config = HistogramConfig {
            lowest_ns: 10,
            highest_ns: 5,
            significant_digits: 3,
        };
        match LatencyRecorder::new(&config) {
            Err(BenchmarkError::ResourceInit { resource, source }) => {
                assert_eq!(resource, "latency histogram");
                assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
            }
            other => panic!("expected ResourceInit, got {:?}", other.map(|r| r.len())),
        }
    }
}
