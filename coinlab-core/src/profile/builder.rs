//! Accumulates tape prints (or candle volume) into price-tick buckets.

use std::collections::BTreeMap;

use crate::domain::{Candle, TapeTrade};
use crate::error::ConfigError;
use crate::profile::VolumeProfile;

/// Mutable accumulator for a volume profile.
///
/// `build()` snapshots the current state; the builder can keep
/// accumulating afterwards (live use rebuilds per window).
#[derive(Debug, Clone)]
pub struct VolumeProfileBuilder {
    tick_size: f64,
    buckets: BTreeMap<i64, f64>,
}

impl VolumeProfileBuilder {
    pub fn new(tick_size: f64) -> Result<Self, ConfigError> {
        if !(tick_size > 0.0) {
            return Err(ConfigError::BadTickSize { value: tick_size });
        }
        Ok(Self {
            tick_size,
            buckets: BTreeMap::new(),
        })
    }

    fn bucket_of(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    /// Accumulate one tape print. NaN or non-positive sizes are ignored.
    pub fn add_trade(&mut self, trade: &TapeTrade) {
        if trade.price.is_nan() || !(trade.size > 0.0) {
            return;
        }
        let idx = self.bucket_of(trade.price);
        *self.buckets.entry(idx).or_insert(0.0) += trade.size;
    }

    /// Accumulate a candle's volume at its close bucket. Used on candle-only
    /// data paths (backtests) where no tape is available.
    pub fn add_candle(&mut self, candle: &Candle) {
        if candle.close.is_nan() || !(candle.volume > 0.0) {
            return;
        }
        let idx = self.bucket_of(candle.close);
        *self.buckets.entry(idx).or_insert(0.0) += candle.volume;
    }

    /// Snapshot the accumulated profile.
    pub fn build(&self) -> VolumeProfile {
        VolumeProfile::new(self.tick_size, self.buckets.clone())
    }

    /// Discard all accumulated volume, keeping the tick size.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

/// Build a profile directly from a candle slice (volume at close).
pub fn profile_from_candles(candles: &[Candle], tick_size: f64) -> Result<VolumeProfile, ConfigError> {
    let mut builder = VolumeProfileBuilder::new(tick_size)?;
    for candle in candles {
        builder.add_candle(candle);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeSide;
    use chrono::{TimeZone, Utc};

    fn trade(price: f64, size: f64) -> TapeTrade {
        TapeTrade {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            price,
            size,
            side: TradeSide::Sell,
        }
    }

    #[test]
    fn rejects_bad_tick_size() {
        assert!(VolumeProfileBuilder::new(0.0).is_err());
        assert!(VolumeProfileBuilder::new(-1.0).is_err());
        assert!(VolumeProfileBuilder::new(f64::NAN).is_err());
    }

    #[test]
    fn accumulates_into_buckets() {
        let mut b = VolumeProfileBuilder::new(0.5).unwrap();
        b.add_trade(&trade(100.1, 2.0));
        b.add_trade(&trade(99.9, 3.0)); // both round to the 100.0 bucket
        b.add_trade(&trade(101.0, 1.0));
        let p = b.build();
        assert_eq!(p.bucket_count(), 2);
        assert_eq!(p.volume_at(100.0), 5.0);
        assert_eq!(p.volume_at(101.0), 1.0);
    }

    #[test]
    fn ignores_degenerate_prints() {
        let mut b = VolumeProfileBuilder::new(1.0).unwrap();
        b.add_trade(&trade(f64::NAN, 2.0));
        b.add_trade(&trade(100.0, 0.0));
        b.add_trade(&trade(100.0, -5.0));
        assert!(b.build().is_empty());
    }

    #[test]
    fn build_is_a_snapshot() {
        let mut b = VolumeProfileBuilder::new(1.0).unwrap();
        b.add_trade(&trade(100.0, 1.0));
        let snapshot = b.build();
        b.add_trade(&trade(100.0, 9.0));
        assert_eq!(snapshot.volume_at(100.0), 1.0);
        assert_eq!(b.build().volume_at(100.0), 10.0);
    }

    #[test]
    fn candle_volume_lands_at_close() {
        let candles = crate::indicators::make_candles(&[100.0, 101.0, 101.0]);
        let p = profile_from_candles(&candles, 1.0).unwrap();
        assert_eq!(p.volume_at(101.0), 2000.0);
        assert_eq!(p.volume_at(100.0), 1000.0);
    }

    #[test]
    fn clear_resets_state() {
        let mut b = VolumeProfileBuilder::new(1.0).unwrap();
        b.add_trade(&trade(100.0, 1.0));
        b.clear();
        assert!(b.build().is_empty());
    }
}
