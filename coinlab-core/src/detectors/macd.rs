//! MACD detector — histogram sign change (MACD line / signal line cross).
//!
//! Strength is the current histogram magnitude relative to its recent
//! range, capped at 1.0: a cross backed by a large histogram swing is
//! stronger than one from a drifting flat histogram.

use crate::detectors::{Cooldown, SignalDetector, DEFAULT_COOLDOWN_BARS};
use crate::domain::{Candle, Direction, Signal, SignalKind};
use crate::indicators::macd_series;

#[derive(Debug, Clone)]
pub struct MacdDetector {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
    /// Bars of histogram history used to normalize strength.
    norm_window: usize,
    cooldown: Cooldown,
}

impl MacdDetector {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
        cooldown_bars: usize,
    ) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(slow_period > fast_period, "slow_period must be > fast_period");
        assert!(signal_period >= 1, "signal_period must be >= 1");
        Self {
            fast_period,
            slow_period,
            signal_period,
            norm_window: 20,
            cooldown: Cooldown::new(cooldown_bars),
        }
    }

    pub fn default_params() -> Self {
        Self::new(12, 26, 9, DEFAULT_COOLDOWN_BARS)
    }
}

impl SignalDetector for MacdDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::Macd
    }

    fn warmup_bars(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal> {
        self.cooldown.tick();

        if candles.len() < self.warmup_bars() + 1 {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let series = macd_series(&closes, self.fast_period, self.slow_period, self.signal_period);
        let t = closes.len() - 1;

        let cur = series.histogram[t];
        let prev = series.histogram[t - 1];
        if cur.is_nan() || prev.is_nan() {
            return None;
        }

        let direction = if prev <= 0.0 && cur > 0.0 {
            Direction::Long
        } else if prev >= 0.0 && cur < 0.0 {
            Direction::Short
        } else {
            return None;
        };

        if !self.cooldown.permits(direction) {
            return None;
        }
        self.cooldown.record(direction);

        // Normalize against the largest histogram swing in the recent window.
        let window_start = t.saturating_sub(self.norm_window);
        let peak = series.histogram[window_start..=t]
            .iter()
            .filter(|v| !v.is_nan())
            .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        let strength = if peak > 0.0 { (cur.abs() / peak).min(1.0) } else { 0.0 };

        let signal = Signal::new(coin, SignalKind::Macd, direction, strength, candles[t].timestamp)
            .with_meta("histogram", cur)
            .with_meta("macd", series.macd[t])
            .with_meta("signal", series.signal[t]);
        Some(signal)
    }

    fn reset(&mut self) {
        self.cooldown.reset();
    }
}
