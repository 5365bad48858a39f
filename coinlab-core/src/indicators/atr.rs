//! Average True Range (ATR), Wilder-smoothed.
//!
//! True Range per bar: max(high-low, |high-prev_close|, |low-prev_close|).
//! The first bar has no previous close, so its TR is excluded from the
//! Wilder seed (marked NaN) and the seed forms over TR[1..=period].

use crate::domain::Candle;

/// True Range series. TR[0] is NaN (no previous close).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            tr[i] = f64::NAN;
        } else {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

/// Wilder smoothing: seed = mean of the first `period` consecutive valid
/// values, then avg = (avg * (period - 1) + new) / period.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    // First window of `period` consecutive non-NaN values.
    let seed_start = (0..n).find(|&i| {
        i + period <= n && values[i..i + period].iter().all(|v| !v.is_nan())
    });
    let Some(seed_start) = seed_start else {
        return result;
    };
    let seed_end = seed_start + period;

    let seed: f64 = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let smoothed = (prev * (period as f64 - 1.0) + values[i]) / period as f64;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

/// Latest ATR value. Needs `period + 1` candles. None when history is short.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    let series = atr_series(candles, period);
    match series.last() {
        Some(&v) if !v.is_nan() => Some(v),
        _ => None,
    }
}

/// Full ATR series, NaN until index `period`.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(candles), period)
}
