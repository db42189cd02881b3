//! wakeup-latency-bench - consumer wake-up strategy benchmark
//!
//! Runs the blocking-wait, busy-poll and event-loop strategies in a
//! shuffled order and prints throughput plus per-worker latency
//! percentiles to stdout. Logs go to stderr.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use wakeup_latency_bench::benchmark::StrategySuite;
use wakeup_latency_bench::config::{BenchmarkConfig, CliArgs};
use wakeup_latency_bench::metrics::{format_count, ReportSink};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn run() -> Result<()> {
    let args = CliArgs::parse_args();

    setup_logging(args.verbose, args.quiet);

    let config = BenchmarkConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    info!(
        "wakeup-latency-bench v{}: {} workers, {} tokens per strategy",
        env!("CARGO_PKG_VERSION"),
        config.driver.workers,
        format_count(config.driver.iterations)
    );

    let suite = StrategySuite::new(config, ReportSink::stdout());
    let results = suite.run_all()?;

    info!("Strategies run: {}", results.len());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
