//! Strategy suite
//!
//! Runs the selected strategies back to back in a shuffled order so that
//! cache warmth or thermal throttling does not always favour the same one.

use tracing::info;

use super::driver::{BenchmarkDriver, RunSummary};
use crate::config::{BenchmarkConfig, Strategy};
use crate::metrics::ReportSink;
use crate::utils::Result;

pub struct StrategySuite {
    config: BenchmarkConfig,
    sink: ReportSink,
}

impl StrategySuite {
    pub fn new(config: BenchmarkConfig, sink: ReportSink) -> Self {
        Self { config, sink }
    }

    /// Selected strategies in run order
    ///
    /// Deterministic for a configured seed, random otherwise.
    pub fn order(&self) -> Vec<Strategy> {
        let mut rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut order = self.config.tests.clone();
        rng.shuffle(&mut order);
        order
    }

    /// Run every selected strategy once; stops at the first failure
    pub fn run_all(&self) -> Result<Vec<RunSummary>> {
        let driver = BenchmarkDriver::new(self.config.driver, self.sink.clone());
        let order = self.order();
        info!(
            "Strategy order: {}",
            order
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut results = Vec::with_capacity(order.len());
        for strategy in order {
            let summary = driver.run_strategy(strategy)?;
            summary.log_summary();
            results.push(summary);
        }
        Ok(results)
    }
}
