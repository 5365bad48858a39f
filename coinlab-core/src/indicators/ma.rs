//! Simple and exponential moving averages.
//!
//! EMA is recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1), seeded with the SMA of the first `period`
//! values. Series forms carry a NaN prefix until the seed is available so
//! indices stay aligned with the input.

/// SMA of the trailing `period` values. None when history is short.
pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    if window.iter().any(|v| v.is_nan()) {
        return None;
    }
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Full SMA series, NaN until `period - 1`.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let mut sum = 0.0;
    for (i, &p) in prices.iter().enumerate() {
        sum += p;
        if i >= period {
            sum -= prices[i - period];
        }
        if i >= period - 1 {
            result[i] = sum / period as f64;
        }
    }
    result
}

/// Latest EMA value. None when history is short.
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    let series = ema_series(prices, period);
    match series.last() {
        Some(&v) if !v.is_nan() => Some(v),
        _ => None,
    }
}

/// Full EMA series over an arbitrary f64 slice, NaN until the seed index.
/// NaN in the input taints everything from that point on.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of first `period` values
    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let next = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = next;
        prev = next;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_basic() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_approx(sma(&prices, 3).unwrap(), 4.0, DEFAULT_EPSILON);
        assert_approx(sma(&prices, 5).unwrap(), 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_insufficient_data() {
        assert!(sma(&[1.0, 2.0], 3).is_none());
        assert!(sma(&[], 1).is_none());
        assert!(sma(&[1.0], 0).is_none());
    }

    #[test]
    fn sma_series_aligns_with_input() {
        let series = sma_series(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(series[0].is_nan());
        assert_approx(series[1], 1.5, DEFAULT_EPSILON);
        assert_approx(series[2], 2.5, DEFAULT_EPSILON);
        assert_approx(series[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seed_is_sma() {
        let prices = [2.0, 4.0, 6.0];
        let series = ema_series(&prices, 3);
        assert_approx(series[2], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_recursion() {
        // period 2 → alpha = 2/3. Seed at index 1 = 1.5.
        // EMA[2] = (2/3)*3 + (1/3)*1.5 = 2.5
        let series = ema_series(&[1.0, 2.0, 3.0], 2);
        assert_approx(series[1], 1.5, DEFAULT_EPSILON);
        assert_approx(series[2], 2.5, DEFAULT_EPSILON);
        assert_approx(ema(&[1.0, 2.0, 3.0], 2).unwrap(), 2.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(ema(&[1.0], 2).is_none());
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let series = ema_series(&[5.0; 10], 4);
        for &v in &series[3..] {
            assert_approx(v, 5.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn nan_input_taints_tail() {
        let series = ema_series(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 2);
        assert!(!series[2].is_nan());
        assert!(series[3].is_nan());
        assert!(series[4].is_nan());
    }
}
