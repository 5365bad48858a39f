//! Volume-profile detector — value-area reclaims, breakouts and
//! breakdowns against a reference profile.
//!
//! The reference profile is built from the earlier half of the trailing
//! window (the "previous session"), so today's price action is judged
//! against yesterday's accepted value — using the evaluation bars
//! themselves would let the profile chase price.
//!
//! Long: close reclaims VAL after trading below it (failed breakdown),
//! or breaks above VAH with the prior close at or below it. Short is the
//! mirror: VAH rejection or VAL breakdown.

use crate::detectors::{Cooldown, SignalDetector, DEFAULT_COOLDOWN_BARS};
use crate::domain::{Candle, Direction, Signal, SignalKind};
use crate::profile::{ValueArea, VolumeProfileBuilder, VALUE_AREA_FRACTION};

#[derive(Debug, Clone)]
pub struct VolumeProfileDetector {
    /// Trailing window length in bars; the first half feeds the profile.
    window: usize,
    tick_size: f64,
    value_area_fraction: f64,
    cooldown: Cooldown,
}

impl VolumeProfileDetector {
    pub fn new(window: usize, tick_size: f64, cooldown_bars: usize) -> Self {
        assert!(window >= 8, "window must be >= 8 bars");
        assert!(tick_size > 0.0, "tick_size must be > 0");
        Self {
            window,
            tick_size,
            value_area_fraction: VALUE_AREA_FRACTION,
            cooldown: Cooldown::new(cooldown_bars),
        }
    }

    pub fn default_params() -> Self {
        Self::new(60, 1.0, DEFAULT_COOLDOWN_BARS)
    }

    fn reference_value_area(&self, candles: &[Candle]) -> Option<ValueArea> {
        let n = candles.len();
        let window = self.window.min(n);
        let session = &candles[n - window..];
        let reference = &session[..session.len() / 2];

        let mut builder = VolumeProfileBuilder::new(self.tick_size).ok()?;
        for candle in reference {
            builder.add_candle(candle);
        }
        builder.build().value_area(self.value_area_fraction).ok()
    }
}

impl SignalDetector for VolumeProfileDetector {
    fn kind(&self) -> SignalKind {
        SignalKind::VolumeProfile
    }

    fn warmup_bars(&self) -> usize {
        self.window / 2
    }

    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal> {
        self.cooldown.tick();

        if candles.len() < self.warmup_bars() + 2 {
            return None;
        }

        let va = self.reference_value_area(candles)?;
        let t = candles.len() - 1;
        let cur = candles[t].close;
        let prev = candles[t - 1].close;
        if cur.is_nan() || prev.is_nan() {
            return None;
        }

        let va_width = (va.high - va.low).max(self.tick_size);

        let (direction, strength, event) = if prev < va.low && cur >= va.low {
            // Failed breakdown: price accepted back into value.
            (Direction::Long, 0.75, "val_reclaim")
        } else if prev <= va.high && cur > va.high {
            let push = ((cur - va.high) / va_width).min(0.4);
            (Direction::Long, 0.6 + push, "vah_breakout")
        } else if prev > va.high && cur <= va.high {
            (Direction::Short, 0.75, "vah_rejection")
        } else if prev >= va.low && cur < va.low {
            let push = ((va.low - cur) / va_width).min(0.4);
            (Direction::Short, 0.6 + push, "val_breakdown")
        } else {
            return None;
        };

        if !self.cooldown.permits(direction) {
            return None;
        }
        self.cooldown.record(direction);

        let signal = Signal::new(coin, SignalKind::VolumeProfile, direction, strength, candles[t].timestamp)
            .with_meta("value_area_low", va.low)
            .with_meta("value_area_high", va.high)
            .with_meta("event", match event {
                "val_reclaim" => 1.0,
                "vah_breakout" => 2.0,
                "vah_rejection" => 3.0,
                _ => 4.0,
            });
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

    /// 20 reference bars clustered around 100, then price action for the
    /// evaluation half.
    fn session(tail: &[f64]) -> Vec<f64> {
        let mut closes = Vec::new();
        for i in 0..20 {
            closes.push(100.0 + (i % 3) as f64 - 1.0); // 99, 100, 101 rotation
        }
        closes.extend_from_slice(tail);
        closes
    }

    fn last_signal(closes: &[f64]) -> Option<Signal> {
        let mut det = VolumeProfileDetector::new(40, 1.0, 10);
        let candles = make_candles(closes);
        det.detect("SOL", &candles)
    }

    #[test]
    fn val_reclaim_fires_long() {
        // Trade below the value area, then close back inside it.
        let closes = session(&[97.0, 96.5, 97.0, 96.0, 100.0]);
        let signal = last_signal(&closes).expect("expected a reclaim signal");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.metadata["event"], 1.0);
    }

    #[test]
    fn vah_breakout_fires_long() {
        let closes = session(&[100.0, 100.5, 100.0, 100.5, 104.0]);
        let signal = last_signal(&closes).expect("expected a breakout signal");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.metadata["event"], 2.0);
        assert!(signal.strength > 0.6);
    }

    #[test]
    fn vah_rejection_fires_short() {
        let closes = session(&[104.0, 104.5, 105.0, 104.0, 100.0]);
        let signal = last_signal(&closes).expect("expected a rejection signal");
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.metadata["event"], 3.0);
    }

    #[test]
    fn val_breakdown_fires_short() {
        let closes = session(&[100.0, 100.5, 100.0, 100.5, 96.0]);
        let signal = last_signal(&closes).expect("expected a breakdown signal");
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.metadata["event"], 4.0);
    }

    #[test]
    fn inside_value_is_silent() {
        let closes = session(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        assert!(last_signal(&closes).is_none());
    }

    #[test]
    fn insufficient_data_is_silent() {
        let mut det = VolumeProfileDetector::default_params();
        let candles = make_candles(&[100.0; 5]);
        assert!(det.detect("SOL", &candles).is_none());
    }

    #[test]
    fn cooldown_suppresses_repeat_reclaims() {
        let mut det = VolumeProfileDetector::new(40, 1.0, 30);
        // Oscillate across VAL repeatedly.
        let mut closes = session(&[]);
        for _ in 0..5 {
            closes.push(96.0);
            closes.push(100.0);
        }
        let candles = make_candles(&closes);
        let mut longs = 0;
        for t in 0..candles.len() {
            if let Some(s) = det.detect("SOL", &candles[..=t]) {
                if s.direction == Direction::Long {
                    longs += 1;
                }
            }
        }
        assert_eq!(longs, 1, "cooldown must stop reclaim spam");
    }
}
