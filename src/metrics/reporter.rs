//! Report formatting and output
//!
//! Two line kinds are produced per strategy run:
//! - one throughput line written by the driver
//! - one percentile line per worker, written by the worker's own thread
//!   when it finalizes
//!
//! Lines go through a [`ReportSink`] so that concurrent writers never
//! interleave within a line.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::recorder::LatencySummary;

/// Destination for report lines
#[derive(Clone)]
pub enum ReportSink {
    /// Process standard output
    Stdout,
    /// In-memory buffer (used by tests and embedding callers)
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl ReportSink {
    pub fn stdout() -> Self {
        ReportSink::Stdout
    }

    pub fn buffer() -> Self {
        ReportSink::Buffer(Arc::new(Mutex::new(Vec::new())))
    }

    /// Write one complete line
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            ReportSink::Stdout => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{}", line)?;
                out.flush()
            }
            ReportSink::Buffer(buf) => {
                let mut buf = buf.lock();
                writeln!(buf, "{}", line)
            }
        }
    }

    /// Buffered output so far (empty for stdout)
    pub fn contents(&self) -> String {
        match self {
            ReportSink::Stdout => String::new(),
            ReportSink::Buffer(buf) => String::from_utf8_lossy(&buf.lock()).into_owned(),
        }
    }
}

impl Default for ReportSink {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Tokens per second; zero when nothing was produced
pub fn throughput(iterations: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if iterations == 0 || secs <= 0.0 {
        0.0
    } else {
        iterations as f64 / secs
    }
}

/// `Test "<name>": Elapsed: <seconds> seconds, Rate: <ops> queues/second`
pub fn format_throughput_line(name: &str, elapsed: Duration, iterations: u64) -> String {
    format!(
        "Test \"{}\": Elapsed: {:.6} seconds, Rate: {:.6} queues/second",
        name,
        elapsed.as_secs_f64(),
        throughput(iterations, elapsed)
    )
}

/// Percentile report line for one worker
pub fn format_summary_line(summary: &LatencySummary) -> String {
    format!(
        "final stats (nanoseconds): min {} max {} median {} 75th {} 95th {} 98th {} 99th {} 99.9th {} mean: {:.6} stddev: {:.6}",
        summary.min,
        summary.max,
        summary.median,
        summary.p75,
        summary.p95,
        summary.p98,
        summary.p99,
        summary.p999,
        summary.mean,
        summary.stddev
    )
}

/// Format large numbers with thousands separators
/// Examples: 1,234,567 or 987,654
pub fn format_count(value: u64) -> String {
    let s = value.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
