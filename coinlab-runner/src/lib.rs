//! coinlab runner — backtest orchestration on top of `coinlab-core`.
//!
//! This crate provides:
//! - TOML configuration with load-time validation
//! - CSV candle loading with strict ordering/sanity checks
//! - Pure performance metrics (return, drawdown, Sharpe, Sortino, ...)
//! - Single-coin runs and parallel multi-coin fan-out with rayon

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod result;
pub mod runner;

pub use config::{AdvisorConfig, BacktestConfig};
pub use data::{load_candles, synthetic_candles};
pub use error::RunnerError;
pub use metrics::PerformanceMetrics;
pub use result::BacktestResult;
pub use runner::{run_all, run_coin, run_coin_with_data};

/// Install the default tracing subscriber: env-filtered, compact output.
/// Call once at process start; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
