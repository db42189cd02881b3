//! wakeup-latency-bench library
//!
//! Measures end-to-end latency and throughput of consumer wake-up
//! strategies (blocking wait, busy poll, event loop) over a shared
//! bounded MPMC queue.

pub mod benchmark;
pub mod config;
pub mod metrics;
pub mod utils;
