//! Result of one backtest run, with computed metrics attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coinlab_core::backtest::BacktestRun;
use coinlab_core::domain::ClosedTrade;

use crate::metrics::PerformanceMetrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub coin: String,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub trades: Vec<ClosedTrade>,
    pub metrics: PerformanceMetrics,
}

impl From<BacktestRun> for BacktestResult {
    fn from(run: BacktestRun) -> Self {
        let equity: Vec<f64> = run.equity_curve.iter().map(|&(_, eq)| eq).collect();
        let metrics = PerformanceMetrics::compute(&equity, &run.trades);
        Self {
            coin: run.coin,
            initial_balance: run.initial_balance,
            final_balance: run.final_balance,
            equity_curve: run.equity_curve,
            trades: run.trades,
            metrics,
        }
    }
}

impl BacktestResult {
    /// One-line human summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} trades, return {:+.2}%, win rate {:.0}%, max dd {:.2}%",
            self.coin,
            self.metrics.trade_count,
            self.metrics.total_return * 100.0,
            self.metrics.win_rate * 100.0,
            self.metrics.max_drawdown * 100.0,
        )
    }
}
