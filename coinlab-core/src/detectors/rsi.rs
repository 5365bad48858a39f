//! RSI detector — threshold crossings and swing-point divergence.
//!
//! Threshold legs: Long when RSI crosses back up through the oversold
//! level, Short when it crosses down through overbought; strength scales
//! with how deep the excursion went before the reclaim.
//!
//! Divergence legs compare the last two *confirmed* swing points in price
//! and RSI (bullish: price makes a lower low while RSI makes a higher
//! low; bearish mirror on highs). Divergence signals carry elevated
//! strength and take precedence over threshold crossings on the same bar.

use crate::detectors::swing::{confirmed_swing_highs, confirmed_swing_lows};
use crate::detectors::{Cooldown, SignalDetector, DEFAULT_COOLDOWN_BARS};
use crate::domain::{Candle, Direction, Signal, SignalKind};
use crate::indicators::rsi_series;

#[derive(Debug, Clone)]
pub struct RsiDetector {
    period: usize,
    oversold: f64,
    overbought: f64,
    /// Bars required on each side of an extremum before it is confirmed.
    confirm_bars: usize,
    /// How far back to look for divergence swing points.
    divergence_lookback: usize,
    cooldown: Cooldown,
}

impl RsiDetector {
    pub fn new(
        period: usize,
        oversold: f64,
        overbought: f64,
        confirm_bars: usize,
        cooldown_bars: usize,
    ) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        assert!(
            0.0 < oversold && oversold < overbought && overbought < 100.0,
            "require 0 < oversold < overbought < 100"
        );
        assert!(confirm_bars >= 1, "confirm_bars must be >= 1");
        Self {
            period,
            oversold,
            overbought,
            confirm_bars,
            divergence_lookback: 50,
            cooldown: Cooldown::new(cooldown_bars),
        }
    }

    pub fn default_params() -> Self {
        Self::new(14, 30.0, 70.0, 3, DEFAULT_COOLDOWN_BARS)
    }

    /// Bullish/bearish divergence against confirmed swing points.
    ///
    /// Only fires when the later pivot has just been confirmed (within one
    /// bar of the earliest possible confirmation), so a divergence is
    /// emitted once, not on every subsequent bar.
    fn divergence(&self, candles: &[Candle], rsi: &[f64]) -> Option<(Direction, f64, f64)> {
        let n = candles.len();
        let window = self.divergence_lookback.min(n);
        let offset = n - window;

        let lows: Vec<f64> = candles[offset..].iter().map(|c| c.low).collect();
        let highs: Vec<f64> = candles[offset..].iter().map(|c| c.high).collect();
        let rsi_window = &rsi[offset..];

        // A pivot at index p is confirmed at bar p + confirm_bars; treat it
        // as fresh for one extra bar to tolerate window truncation.
        let fresh_from = window.saturating_sub(self.confirm_bars + 2);

        let price_lows = confirmed_swing_lows(&lows, self.confirm_bars);
        if let [.., p1, p2] = price_lows[..] {
            if p2.index >= fresh_from
                && p2.value < p1.value
                && !rsi_window[p1.index].is_nan()
                && !rsi_window[p2.index].is_nan()
                && rsi_window[p2.index] > rsi_window[p1.index]
            {
                let gap = rsi_window[p2.index] - rsi_window[p1.index];
                return Some((Direction::Long, gap, p2.value));
            }
        }

        let price_highs = confirmed_swing_highs(&highs, self.confirm_bars);
        if let [.., p1, p2] = price_highs[..] {
            if p2.index >= fresh_from
                && p2.value > p1.value
                && !rsi_window[p1.index].is_nan()
                && !rsi_window[p2.index].is_nan()
                && rsi_window[p2.index] < rsi_window[p1.index]
            {
                let gap = rsi_window[p1.index] - rsi_window[p2.index];
                return Some((Direction::Short, gap, p2.value));
            }
        }

        None
    }
}

impl SignalDetector for RsiDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::Rsi
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal> {
        self.cooldown.tick();

        if candles.len() < self.warmup_bars() + 1 {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = rsi_series(&closes, self.period);
        let t = closes.len() - 1;
        let (cur, prev) = (rsi[t], rsi[t - 1]);
        if cur.is_nan() || prev.is_nan() {
            return None;
        }
        let now = candles[t].timestamp;

        // Divergence first: rarer and higher conviction.
        if let Some((direction, rsi_gap, pivot_price)) = self.divergence(candles, &rsi) {
            if self.cooldown.permits(direction) {
                self.cooldown.record(direction);
                let strength = 0.8 + 0.2 * (rsi_gap / 10.0).min(1.0);
                let signal = Signal::new(coin, SignalKind::Rsi, direction, strength, now)
                    .with_meta("rsi", cur)
                    .with_meta("divergence", 1.0)
                    .with_meta("divergence_pivot_price", pivot_price);
                return Some(signal);
            }
        }

        // Oversold reclaim → Long.
        if prev <= self.oversold && cur > self.oversold {
            if !self.cooldown.permits(Direction::Long) {
                return None;
            }
            self.cooldown.record(Direction::Long);
            let depth = (self.oversold - prev) / self.oversold;
            let strength = 0.5 + 0.5 * depth.clamp(0.0, 1.0);
            let signal = Signal::new(coin, SignalKind::Rsi, Direction::Long, strength, now)
                .with_meta("rsi", cur)
                .with_meta("rsi_prev", prev)
                .with_meta("threshold", self.oversold);
            return Some(signal);
        }

        // Overbought rejection → Short.
        if prev >= self.overbought && cur < self.overbought {
            if !self.cooldown.permits(Direction::Short) {
                return None;
            }
            self.cooldown.record(Direction::Short);
            let depth = (prev - self.overbought) / (100.0 - self.overbought);
            let strength = 0.5 + 0.5 * depth.clamp(0.0, 1.0);
            let signal = Signal::new(coin, SignalKind::Rsi, Direction::Short, strength, now)
                .with_meta("rsi", cur)
                .with_meta("rsi_prev", prev)
                .with_meta("threshold", self.overbought);
            return Some(signal);
        }

        None
    }

    fn reset(&mut self) {
        self.cooldown.reset();
    }
}
