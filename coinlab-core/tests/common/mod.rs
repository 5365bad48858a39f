//! Shared helpers for integration tests.
#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use coinlab_core::domain::Candle;

/// Synthetic candles from close prices: open = previous close, high/low
/// pad the body by 1.0, constant volume, one-minute bars.
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// A long decline into a sharp recovery — the canonical series that
/// trips the momentum and RSI detectors Long.
pub fn decline_then_recovery() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 200.0 - 5.0 * i as f64).collect();
    for i in 0..30 {
        closes.push(58.0 + 4.0 * i as f64);
    }
    closes
}
