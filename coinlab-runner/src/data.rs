//! Candle data loading.
//!
//! Primary path: CSV files with a `timestamp,open,high,low,close,volume`
//! header, timestamps RFC 3339. Loading is strict: out-of-order or
//! duplicate timestamps and insane OHLC rows are rejected, never
//! silently repaired.
//!
//! A seeded synthetic generator covers demos and tests that have no
//! real data on disk.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use coinlab_core::domain::Candle;

use crate::error::RunnerError;

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Candle {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Load and validate a candle CSV.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, RunnerError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| RunnerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut candles: Vec<Candle> = Vec::new();
    for (line, row) in reader.deserialize::<CandleRow>().enumerate() {
        let row = row.map_err(|e| RunnerError::Parse {
            path: path.to_path_buf(),
            message: format!("row {}: {e}", line + 1),
        })?;
        let candle: Candle = row.into();

        if !candle.is_sane() {
            return Err(RunnerError::BadData {
                path: path.to_path_buf(),
                message: format!("row {}: insane OHLCV at {}", line + 1, candle.timestamp),
            });
        }
        if let Some(prev) = candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(RunnerError::BadData {
                    path: path.to_path_buf(),
                    message: format!(
                        "row {}: timestamp {} not strictly after {}",
                        line + 1,
                        candle.timestamp,
                        prev.timestamp
                    ),
                });
            }
        }
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(RunnerError::BadData {
            path: path.to_path_buf(),
            message: "no candle rows".to_string(),
        });
    }

    info!(path = %path.display(), bars = candles.len(), "loaded candles");
    Ok(candles)
}

/// Deterministic synthetic candle series: a seeded geometric random walk
/// with plausible intrabar ranges. Same seed, same series.
pub fn synthetic_candles(seed: u64, bars: usize, start_price: f64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut price = start_price;

    (0..bars)
        .map(|i| {
            let open = price;
            let drift: f64 = rng.gen_range(-0.015..0.015);
            price = (price * (1.0 + drift)).max(0.01);
            let close = price;
            let span = (open - close).abs();
            let high = open.max(close) + rng.gen_range(0.0..span.max(0.1));
            let low = (open.min(close) - rng.gen_range(0.0..span.max(0.1))).max(0.001);
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(100.0..10_000.0),
            }
        })
        .collect()
}
