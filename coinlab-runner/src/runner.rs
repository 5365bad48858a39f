//! Backtest orchestration: one coin per run, coins in parallel.
//!
//! Each coin gets its own aggregator, brain, and engine — detector and
//! cooldown state is exclusively owned by the worker running that coin,
//! so the rayon fan-out needs no synchronization. A coin that fails to
//! load reports its error without aborting the others.

use rayon::prelude::*;
use std::time::Duration;
use tracing::{error, info};

use coinlab_core::aggregator::SignalAggregator;
use coinlab_core::backtest::BacktestEngine;
use coinlab_core::brain::{Advisor, AdvisoryRequest, AdvisoryResponse, HttpAdvisor, NullAdvisor, SignalBrain};
use coinlab_core::domain::Candle;
use coinlab_core::error::AdvisorError;

use crate::config::{AdvisorConfig, BacktestConfig};
use crate::data::load_candles;
use crate::error::RunnerError;
use crate::result::BacktestResult;

/// Advisor selected by configuration. Closed set, like the detector enum.
pub enum ConfiguredAdvisor {
    Null(NullAdvisor),
    Http(HttpAdvisor),
}

impl Advisor for ConfiguredAdvisor {
    fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisorError> {
        match self {
            ConfiguredAdvisor::Null(a) => a.advise(request),
            ConfiguredAdvisor::Http(a) => a.advise(request),
        }
    }
}

fn build_advisor(config: &AdvisorConfig) -> Result<ConfiguredAdvisor, RunnerError> {
    match config {
        AdvisorConfig::Disabled => Ok(ConfiguredAdvisor::Null(NullAdvisor)),
        AdvisorConfig::Http { endpoint, timeout_ms } => {
            let advisor = HttpAdvisor::new(endpoint.clone(), Duration::from_millis(*timeout_ms))
                .map_err(|e| RunnerError::Invalid(format!("advisor setup failed: {e}")))?;
            Ok(ConfiguredAdvisor::Http(advisor))
        }
    }
}

fn build_engine(config: &BacktestConfig) -> Result<BacktestEngine<ConfiguredAdvisor>, RunnerError> {
    let advisor = build_advisor(&config.advisor)?;
    let brain = SignalBrain::new(config.strategy.clone(), advisor)?;
    let aggregator = SignalAggregator::new(config.detectors.clone());
    let mut engine = BacktestEngine::new(brain, aggregator, config.initial_balance);
    if let Some(goal) = config.goal {
        engine = engine.with_goal(goal);
    }
    Ok(engine)
}

/// Run one coin against an already-loaded candle series.
pub fn run_coin_with_data(
    config: &BacktestConfig,
    coin: &str,
    candles: &[Candle],
) -> Result<BacktestResult, RunnerError> {
    let mut engine = build_engine(config)?;
    let run = engine.run(coin, candles);
    let result = BacktestResult::from(run);
    info!("{}", result.summary());
    Ok(result)
}

/// Load `<data_dir>/<coin>.csv` and run one coin.
pub fn run_coin(config: &BacktestConfig, coin: &str) -> Result<BacktestResult, RunnerError> {
    let candles = load_candles(&config.data_path(coin))?;
    run_coin_with_data(config, coin, &candles)
}

/// Run every configured coin in parallel. Per-coin failures are reported
/// in place; one bad coin never aborts the rest.
pub fn run_all(config: &BacktestConfig) -> Vec<(String, Result<BacktestResult, RunnerError>)> {
    config
        .coins
        .par_iter()
        .map(|coin| {
            let outcome = run_coin(config, coin);
            if let Err(e) = &outcome {
                error!(coin, error = %e, "backtest failed");
            }
            (coin.clone(), outcome)
        })
        .collect()
}
