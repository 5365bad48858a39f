//! coinlab core — signal scoring and position decision engine.
//!
//! The pipeline, in data-flow order:
//! - Domain types (candles, signals, strategies, plans, positions)
//! - Indicators (SMA/EMA, RSI, MACD, ATR) as pure series functions
//! - Volume profile (POC, value area, HVNs) bucketed by price tick
//! - Stateful detectors with per-direction cooldowns
//! - Aggregator collecting per-coin signal history
//! - Level calculator (structure-aware stops/targets, ATR fallback)
//! - Decision brain: scoring, levels, bounded advisory sizing
//! - Walk-forward backtest engine with a tighten-only trailing stop

pub mod aggregator;
pub mod backtest;
pub mod brain;
pub mod detectors;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod profile;
