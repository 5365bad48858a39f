//! Serializable backtest configuration, loaded from TOML.
//!
//! Validation happens at load time and delegates to
//! `Strategy::validate` — a config that parses but carries nonsense
//! values is rejected before any data is touched.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use coinlab_core::domain::{Goal, SignalKind, Strategy};

use crate::error::RunnerError;

/// Advisory endpoint selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdvisorConfig {
    /// No advisory input: multiplier is always 1.0.
    Disabled,
    /// JSON-over-HTTP advisor with a hard timeout.
    Http { endpoint: String, timeout_ms: u64 },
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig::Disabled
    }
}

fn default_initial_balance() -> f64 {
    10_000.0
}

fn default_detectors() -> Vec<SignalKind> {
    SignalKind::ALL.to_vec()
}

/// Full configuration for one backtest run over one or more coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Directory holding `<coin>.csv` candle files.
    pub data_dir: PathBuf,
    /// Coins to run, one backtest each.
    pub coins: Vec<String>,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    /// Detector families to enable.
    #[serde(default = "default_detectors")]
    pub detectors: Vec<SignalKind>,
    pub strategy: Strategy,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    /// Optional balance goal for pace-aware advisory context.
    #[serde(default)]
    pub goal: Option<Goal>,
}

impl BacktestConfig {
    /// Parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| RunnerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        self.strategy.validate()?;
        if self.coins.is_empty() {
            return Err(RunnerError::Invalid("no coins configured".to_string()));
        }
        if !(self.initial_balance > 0.0) {
            return Err(RunnerError::Invalid(format!(
                "initial_balance must be > 0, got {}",
                self.initial_balance
            )));
        }
        if self.detectors.is_empty() {
            return Err(RunnerError::Invalid("no detectors enabled".to_string()));
        }
        if let AdvisorConfig::Http { endpoint, timeout_ms } = &self.advisor {
            if endpoint.is_empty() {
                return Err(RunnerError::Invalid("advisor endpoint is empty".to_string()));
            }
            if *timeout_ms == 0 {
                return Err(RunnerError::Invalid("advisor timeout_ms must be > 0".to_string()));
            }
        }
        Ok(())
    }

    /// Path of the candle CSV for `coin`.
    pub fn data_path(&self, coin: &str) -> PathBuf {
        self.data_dir.join(format!("{coin}.csv"))
    }
}
