//! Momentum detector — fast/slow EMA crossover.
//!
//! Fires Long when the fast EMA crosses above the slow EMA on the current
//! bar (fast[t-1] <= slow[t-1] and fast[t] > slow[t]), Short on the
//! mirror. On the first bar where both EMAs are valid there is no prior
//! ordering to cross from, so the seed ordering itself fires: a trend
//! already established during warmup is a signal, not silence. Strength
//! is the EMA gap normalized by ATR, capped at 1.0 — a wide separation
//! relative to recent volatility is a stronger cross.

use crate::detectors::{Cooldown, SignalDetector, DEFAULT_COOLDOWN_BARS};
use crate::domain::{Candle, Direction, Signal, SignalKind};
use crate::indicators::{atr, ema_series};

#[derive(Debug, Clone)]
pub struct MomentumDetector {
    fast_period: usize,
    slow_period: usize,
    atr_period: usize,
    cooldown: Cooldown,
}

impl MomentumDetector {
    pub fn new(fast_period: usize, slow_period: usize, atr_period: usize, cooldown_bars: usize) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(slow_period > fast_period, "slow_period must be > fast_period");
        assert!(atr_period >= 1, "atr_period must be >= 1");
        Self {
            fast_period,
            slow_period,
            atr_period,
            cooldown: Cooldown::new(cooldown_bars),
        }
    }

    pub fn default_params() -> Self {
        Self::new(9, 21, 14, DEFAULT_COOLDOWN_BARS)
    }
}

impl SignalDetector for MomentumDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::Momentum
    }

    fn warmup_bars(&self) -> usize {
        self.slow_period.max(self.atr_period + 1)
    }

    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal> {
        self.cooldown.tick();

        if candles.len() < self.warmup_bars() {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let fast = ema_series(&closes, self.fast_period);
        let slow = ema_series(&closes, self.slow_period);
        let t = closes.len() - 1;

        let (fc, sc) = (fast[t], slow[t]);
        if fc.is_nan() || sc.is_nan() {
            return None;
        }

        // A NaN previous value means this is the seed bar: the EMAs just
        // became comparable, so their ordering stands in for a cross.
        let (fp, sp) = (fast[t - 1], slow[t - 1]);
        let seeding = fp.is_nan() || sp.is_nan();

        let direction = if fc > sc && (seeding || fp <= sp) {
            Direction::Long
        } else if fc < sc && (seeding || fp >= sp) {
            Direction::Short
        } else {
            return None;
        };

        let atr = atr(candles, self.atr_period)?;
        if !(atr > 0.0) {
            return None;
        }

        if !self.cooldown.permits(direction) {
            return None;
        }
        self.cooldown.record(direction);

        let strength = ((fc - sc).abs() / atr).min(1.0);
        let signal = Signal::new(coin, SignalKind::Momentum, direction, strength, candles[t].timestamp)
            .with_meta("fast_ema", fc)
            .with_meta("slow_ema", sc)
            .with_meta("atr", atr);
        Some(signal)
    }

    fn reset(&mut self) {
        self.cooldown.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    /// Downtrend long enough to seed the EMAs, then a sharp reversal that
    /// forces the fast EMA through the slow one.
    fn reversal_up_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
        for i in 0..12 {
            closes.push(101.0 + 4.0 * i as f64);
        }
        closes
    }

    fn detect_all(detector: &mut MomentumDetector, closes: &[f64]) -> Vec<Signal> {
        let candles = make_candles(closes);
        let mut signals = Vec::new();
        for t in 0..candles.len() {
            if let Some(s) = detector.detect("BTC", &candles[..=t]) {
                signals.push(s);
            }
        }
        signals
    }

    #[test]
    fn fires_long_on_cross_up() {
        let mut det = MomentumDetector::default_params();
        let signals = detect_all(&mut det, &reversal_up_closes());
        // The downtrend seeds a Short; the reversal must cross Long.
        let long = signals
            .iter()
            .find(|s| s.direction == Direction::Long)
            .expect("the reversal must produce a long crossover");
        assert!(long.strength > 0.0 && long.strength <= 1.0);
    }

    #[test]
    fn fires_short_on_cross_down() {
        let mut closes: Vec<f64> = (0..30).map(|i| 70.0 + i as f64).collect();
        for i in 0..12 {
            closes.push(99.0 - 4.0 * i as f64);
        }
        let mut det = MomentumDetector::default_params();
        let signals = detect_all(&mut det, &closes);
        assert!(signals.iter().any(|s| s.direction == Direction::Short));
    }

    #[test]
    fn established_trend_fires_once_at_seed() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 0.5 * i as f64).collect();
        let mut det = MomentumDetector::default_params();
        let signals = detect_all(&mut det, &closes);
        assert_eq!(signals.len(), 1, "a trend announces itself exactly once");
        assert_eq!(signals[0].direction, Direction::Long);
        assert!(signals[0].strength > 0.0 && signals[0].strength <= 1.0);

        let falling: Vec<f64> = (0..60).map(|i| 130.0 - 0.5 * i as f64).collect();
        let mut det = MomentumDetector::default_params();
        let signals = detect_all(&mut det, &falling);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].direction, Direction::Short);
    }

    #[test]
    fn no_refire_after_trend_is_established() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let mut det = MomentumDetector::default_params();
        // Start past the seed bar: the fast EMA stays above the slow one,
        // so no further crossovers exist.
        let candles = make_candles(&closes);
        let mut fired = 0;
        for t in 30..candles.len() {
            if det.detect("BTC", &candles[..=t]).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 0, "steady uptrend must not re-fire crossovers");
    }

    #[test]
    fn insufficient_data_is_silent() {
        let mut det = MomentumDetector::default_params();
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        assert!(det.detect("BTC", &candles).is_none());
    }

    #[test]
    fn metadata_records_emas() {
        let mut det = MomentumDetector::default_params();
        let signals = detect_all(&mut det, &reversal_up_closes());
        let meta = &signals[0].metadata;
        assert!(meta.contains_key("fast_ema"));
        assert!(meta.contains_key("slow_ema"));
        assert!(meta.contains_key("atr"));
    }
}
