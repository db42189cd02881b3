//! Latency recording and reporting
//!
//! This module provides:
//! - Per-worker nanosecond latency histograms
//! - Throughput and percentile report lines
//! - A line-atomic output sink shared by the driver and worker threads

pub mod recorder;
pub mod reporter;

pub use recorder::{LatencyRecorder, LatencySummary};
pub use reporter::{
    format_count, format_summary_line, format_throughput_line, throughput, ReportSink,
};
