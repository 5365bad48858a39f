//! MACD — Moving Average Convergence Divergence.
//!
//! macd_line = EMA(fast) - EMA(slow)
//! signal_line = EMA(macd_line, signal_period)
//! histogram = macd_line - signal_line (exact identity, by construction)

use crate::indicators::ma::ema_series;

/// One MACD observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Aligned MACD series; all three vectors have the input's length with
/// NaN prefixes until enough history accumulates.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    /// The last fully-formed point, if any.
    pub fn last_point(&self) -> Option<MacdPoint> {
        let i = self.macd.len().checked_sub(1)?;
        self.point(i)
    }

    pub fn point(&self, i: usize) -> Option<MacdPoint> {
        let (m, s, h) = (self.macd[i], self.signal[i], self.histogram[i]);
        if m.is_nan() || s.is_nan() || h.is_nan() {
            return None;
        }
        Some(MacdPoint {
            macd: m,
            signal: s,
            histogram: h,
        })
    }
}

/// Latest MACD point. None when history is short.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdPoint> {
    macd_series(prices, fast, slow, signal).last_point()
}

/// Full MACD series.
///
/// The signal line is the EMA of the macd line; its seed window starts at
/// the macd line's first valid index, so leading NaNs are skipped rather
/// than tainting the whole series.
pub fn macd_series(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    assert!(fast >= 1 && slow > fast, "require slow > fast >= 1");
    assert!(signal >= 1, "signal period must be >= 1");

    let n = prices.len();
    let fast_ema = ema_series(prices, fast);
    let slow_ema = ema_series(prices, slow);

    let mut macd_line = vec![f64::NAN; n];
    for i in 0..n {
        if !fast_ema[i].is_nan() && !slow_ema[i].is_nan() {
            macd_line[i] = fast_ema[i] - slow_ema[i];
        }
    }

    // EMA over the valid suffix of the macd line.
    let first_valid = macd_line.iter().position(|v| !v.is_nan());
    let mut signal_line = vec![f64::NAN; n];
    if let Some(start) = first_valid {
        let tail = ema_series(&macd_line[start..], signal);
        for (offset, v) in tail.into_iter().enumerate() {
            signal_line[start + offset] = v;
        }
    }

    let mut histogram = vec![f64::NAN; n];
    for i in 0..n {
        if !macd_line[i].is_nan() && !signal_line[i].is_nan() {
            histogram[i] = macd_line[i] - signal_line[i];
        }
    }

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn histogram_identity_everywhere() {
        let series = macd_series(&ramp(80), 12, 26, 9);
        for i in 0..80 {
            if let Some(p) = series.point(i) {
                assert_eq!(p.histogram, p.macd - p.signal);
            }
        }
    }

    #[test]
    fn uptrend_has_positive_macd() {
        let p = macd(&ramp(80), 12, 26, 9).unwrap();
        assert!(p.macd > 0.0, "fast EMA should lead slow in an uptrend");
    }

    #[test]
    fn constant_series_is_zero() {
        let p = macd(&[50.0; 60], 12, 26, 9).unwrap();
        assert_approx(p.macd, 0.0, DEFAULT_EPSILON);
        assert_approx(p.signal, 0.0, DEFAULT_EPSILON);
        assert_approx(p.histogram, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn insufficient_data_returns_none() {
        assert!(macd(&ramp(10), 12, 26, 9).is_none());
    }

    #[test]
    fn nan_prefix_before_signal_seed() {
        // macd line first valid at slow-1 = 25; signal seed needs 9 more.
        let series = macd_series(&ramp(80), 12, 26, 9);
        assert!(series.macd[24].is_nan());
        assert!(!series.macd[25].is_nan());
        assert!(series.signal[32].is_nan());
        assert!(!series.signal[33].is_nan());
    }

    #[test]
    #[should_panic(expected = "slow > fast")]
    fn rejects_fast_geq_slow() {
        macd_series(&ramp(80), 26, 12, 9);
    }
}
