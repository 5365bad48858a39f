//! Relative Strength Index (RSI), Wilder's original recurrence.
//!
//! Seed: simple average of the first `period` gains/losses.
//! Then: avg = (avg * (period - 1) + new) / period.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0;
//! both zero (flat seed window) → 50.

/// Latest RSI value. Needs `period + 1` prices. None when history is short.
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    let series = rsi_series(prices, period);
    match series.last() {
        Some(&v) if !v.is_nan() => Some(v),
        _ => None,
    }
}

/// Full RSI series, NaN until index `period`.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    // Seed: simple average of the first `period` gains and losses.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change.is_nan() {
            return result;
        }
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = rsi_from_averages(avg_gain, avg_loss);

    // Wilder recurrence: avg = (avg * (period - 1) + new) / period.
    for i in (period + 1)..n {
        let change = prices[i] - prices[i - 1];
        if change.is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;

        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // flat window, no movement either way
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn all_gains_hits_100() {
        let prices = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        assert_approx(rsi(&prices, 3).unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn all_losses_hits_0() {
        let prices = [105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        assert_approx(rsi(&prices, 3).unwrap(), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_50() {
        let prices = [100.0; 6];
        assert_approx(rsi(&prices, 3).unwrap(), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_recurrence_exact() {
        // Closes: 44, 44.34, 44.09, 43.61, 44.33 with period 3.
        // Seed changes: +0.34, -0.25, -0.48 → avg_gain = 0.34/3, avg_loss = 0.73/3.
        // RSI[3] = 100 - 100/(1 + 0.34/0.73).
        // Next change +0.72:
        // avg_gain = (0.34/3 * 2 + 0.72)/3, avg_loss = (0.73/3 * 2)/3.
        let prices = [44.0, 44.34, 44.09, 43.61, 44.33];
        let series = rsi_series(&prices, 3);

        let seed_rsi = 100.0 - 100.0 / (1.0 + (0.34 / 3.0) / (0.73 / 3.0));
        assert_approx(series[3], seed_rsi, 1e-9);

        let ag = (0.34 / 3.0 * 2.0 + 0.72) / 3.0;
        let al = (0.73 / 3.0 * 2.0) / 3.0;
        let expected = 100.0 - 100.0 / (1.0 + ag / al);
        assert_approx(series[4], expected, 1e-9);
    }

    #[test]
    fn bounds_hold_on_noisy_series() {
        let prices = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0, 85.0];
        for &v in rsi_series(&prices, 3).iter() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {v}");
            }
        }
    }

    #[test]
    fn insufficient_data_returns_none() {
        assert!(rsi(&[100.0, 101.0, 102.0], 14).is_none());
        assert!(rsi(&[], 14).is_none());
    }

    #[test]
    fn series_nan_prefix_length() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        let series = rsi_series(&prices, 3);
        assert!(series[0].is_nan());
        assert!(series[1].is_nan());
        assert!(series[2].is_nan());
        assert!(!series[3].is_nan());
    }

    #[test]
    fn deterministic() {
        let prices = [44.0, 44.34, 44.09, 43.61, 44.33, 44.83, 45.10];
        assert_eq!(rsi_series(&prices, 3), rsi_series(&prices, 3));
    }
}
