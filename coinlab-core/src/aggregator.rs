//! Signal aggregator — runs the configured detector set per coin and
//! retains recent signal history.
//!
//! Each coin gets its own detector instances (created on first use from
//! the configured template), so cooldown and divergence state never leak
//! across coins and each coin's state can be exclusively owned by one
//! worker. Absence of signals is the normal case, not an error.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::detectors::{Detector, SignalDetector};
use crate::domain::{Candle, Direction, Signal, SignalKind};

/// How long emitted signals are retained for recency queries.
const RETENTION_SECONDS: i64 = 3600;

#[derive(Debug)]
struct CoinState {
    detectors: Vec<Detector>,
    history: Vec<Signal>,
}

/// Runs every configured detector over one coin's candle window and
/// collects the emitted signals.
#[derive(Debug)]
pub struct SignalAggregator {
    kinds: Vec<SignalKind>,
    states: HashMap<String, CoinState>,
    retention: Duration,
}

impl SignalAggregator {
    /// Aggregator over the given detector families (default parameters).
    pub fn new(kinds: Vec<SignalKind>) -> Self {
        Self {
            kinds,
            states: HashMap::new(),
            retention: Duration::seconds(RETENTION_SECONDS),
        }
    }

    /// Aggregator with the full default detector set.
    pub fn with_all_detectors() -> Self {
        Self::new(SignalKind::ALL.to_vec())
    }

    fn state_for(&mut self, coin: &str) -> &mut CoinState {
        let kinds = &self.kinds;
        self.states
            .entry(coin.to_string())
            .or_insert_with(|| CoinState {
                detectors: kinds.iter().map(|&k| Detector::from_kind(k)).collect(),
                history: Vec::new(),
            })
    }

    /// Run all detectors for `coin` against the candle window. Returns only
    /// the signals emitted this cycle.
    pub fn process_candle(&mut self, coin: &str, candles: &[Candle]) -> Vec<Signal> {
        if candles.is_empty() {
            return Vec::new();
        }
        let now = candles[candles.len() - 1].timestamp;
        let retention = self.retention;
        let state = self.state_for(coin);

        let mut emitted = Vec::new();
        for detector in &mut state.detectors {
            if let Some(signal) = detector.detect(coin, candles) {
                debug!(
                    coin,
                    kind = %signal.kind,
                    direction = %signal.direction,
                    strength = signal.strength,
                    "signal emitted"
                );
                emitted.push(signal);
            }
        }

        state.history.extend(emitted.iter().cloned());
        let horizon = now - retention;
        state.history.retain(|s| s.timestamp >= horizon);

        emitted
    }

    /// Signals for `coin` emitted within the trailing window ending at `now`.
    pub fn pending_signals(&self, coin: &str, now: DateTime<Utc>, window: Duration) -> Vec<Signal> {
        let Some(state) = self.states.get(coin) else {
            return Vec::new();
        };
        let from = now - window;
        state
            .history
            .iter()
            .filter(|s| s.timestamp >= from && s.timestamp <= now)
            .cloned()
            .collect()
    }

    /// The agreed direction of all pending signals, or None when they
    /// disagree (or none are pending). Used when a strategy prefers
    /// consensus.
    pub fn consensus_direction(
        &self,
        coin: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Option<Direction> {
        let pending = self.pending_signals(coin, now, window);
        let first = pending.first()?.direction;
        pending
            .iter()
            .all(|s| s.direction == first)
            .then_some(first)
    }

    /// Drop all detector and history state for `coin`.
    pub fn reset(&mut self, coin: &str) {
        self.states.remove(coin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    /// Downtrend long enough to seed everything, then a sharp reversal —
    /// trips momentum and RSI.
    fn reversal_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..30).map(|i| 200.0 - 5.0 * i as f64).collect();
        for i in 0..12 {
            closes.push(58.0 + 6.0 * i as f64);
        }
        closes
    }

    fn run_series(agg: &mut SignalAggregator, coin: &str, closes: &[f64]) -> Vec<Signal> {
        let candles = make_candles(closes);
        let mut all = Vec::new();
        for t in 0..candles.len() {
            all.extend(agg.process_candle(coin, &candles[..=t]));
        }
        all
    }

    #[test]
    fn emits_signals_on_reversal() {
        let mut agg = SignalAggregator::new(vec![SignalKind::Momentum, SignalKind::Rsi]);
        let closes = reversal_closes();
        let reversal_ts = make_candles(&closes)[30].timestamp;
        let signals = run_series(&mut agg, "BTC", &closes);
        assert!(signals.iter().any(|s| s.direction == Direction::Long));
        // Short signals can only come from the falling leg.
        assert!(signals
            .iter()
            .filter(|s| s.direction == Direction::Short)
            .all(|s| s.timestamp < reversal_ts));
    }

    #[test]
    fn no_signals_without_data() {
        let mut agg = SignalAggregator::with_all_detectors();
        assert!(agg.process_candle("BTC", &[]).is_empty());
    }

    #[test]
    fn pending_signals_respect_window() {
        let mut agg = SignalAggregator::new(vec![SignalKind::Momentum, SignalKind::Rsi]);
        let closes = reversal_closes();
        let candles = make_candles(&closes);
        for t in 0..candles.len() {
            agg.process_candle("BTC", &candles[..=t]);
        }
        let now = candles.last().unwrap().timestamp;

        let recent = agg.pending_signals("BTC", now, Duration::minutes(100));
        assert!(!recent.is_empty());
        let none = agg.pending_signals("BTC", now + Duration::hours(5), Duration::minutes(1));
        assert!(none.is_empty());
    }

    #[test]
    fn consensus_requires_agreement() {
        let mut agg = SignalAggregator::new(vec![SignalKind::Momentum, SignalKind::Rsi]);
        let closes = reversal_closes();
        let candles = make_candles(&closes);
        for t in 0..candles.len() {
            agg.process_candle("BTC", &candles[..=t]);
        }
        let now = candles.last().unwrap().timestamp;
        // A window over the recovery leg only: every pending signal is Long.
        assert_eq!(
            agg.consensus_direction("BTC", now, Duration::minutes(11)),
            Some(Direction::Long)
        );
        // Widen past the falling leg and its shorts break the agreement.
        assert_eq!(agg.consensus_direction("BTC", now, Duration::minutes(100)), None);
        // Unknown coin: nothing pending, no consensus.
        assert_eq!(agg.consensus_direction("ETH", now, Duration::minutes(100)), None);
    }

    #[test]
    fn per_coin_state_is_independent() {
        let mut agg = SignalAggregator::new(vec![SignalKind::Momentum, SignalKind::Rsi]);
        let closes = reversal_closes();
        let btc = run_series(&mut agg, "BTC", &closes);
        // Fresh cooldowns for the second coin: the same series emits the
        // same signals.
        let eth = run_series(&mut agg, "ETH", &closes);
        assert_eq!(btc.len(), eth.len());
    }

    #[test]
    fn reset_clears_cooldowns() {
        let mut agg = SignalAggregator::new(vec![SignalKind::Momentum, SignalKind::Rsi]);
        let closes = reversal_closes();
        let first = run_series(&mut agg, "BTC", &closes);
        agg.reset("BTC");
        let second = run_series(&mut agg, "BTC", &closes);
        assert_eq!(first.len(), second.len());
    }
}
