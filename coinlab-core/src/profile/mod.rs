//! Volume profile — price-bucketed volume and the structural levels
//! derived from it (POC, value area, HVNs).
//!
//! A profile is rebuilt wholesale per analysis window and owned by
//! whichever component requested it; the engine never persists one.
//! All queries on an empty profile return `ProfileError::Empty` rather
//! than arbitrary defaults.

pub mod builder;

pub use builder::VolumeProfileBuilder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProfileError;

/// Value area bounds: the price range holding the target volume fraction,
/// expanded outward from POC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueArea {
    pub low: f64,
    pub high: f64,
    /// Fraction of total volume actually captured (>= the requested
    /// target unless the whole profile was consumed).
    pub volume_fraction: f64,
}

/// Default value-area target: 70% of total volume.
pub const VALUE_AREA_FRACTION: f64 = 0.70;

/// Default HVN significance: bucket volume must exceed 1.5x the mean.
pub const HVN_SIGNIFICANCE: f64 = 1.5;

/// An immutable snapshot of volume bucketed by price tick.
///
/// Bucket keys are tick indices (`round(price / tick_size)`), so the map
/// iterates in ascending price order and lookups are exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    tick_size: f64,
    buckets: BTreeMap<i64, f64>,
}

impl VolumeProfile {
    pub(crate) fn new(tick_size: f64, buckets: BTreeMap<i64, f64>) -> Self {
        Self { tick_size, buckets }
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn total_volume(&self) -> f64 {
        self.buckets.values().sum()
    }

    /// Volume accumulated at the bucket containing `price`.
    pub fn volume_at(&self, price: f64) -> f64 {
        let idx = (price / self.tick_size).round() as i64;
        self.buckets.get(&idx).copied().unwrap_or(0.0)
    }

    fn price_of(&self, idx: i64) -> f64 {
        idx as f64 * self.tick_size
    }

    /// Buckets sorted by price ascending.
    fn sorted_buckets(&self) -> Vec<(i64, f64)> {
        self.buckets.iter().map(|(&k, &v)| (k, v)).collect()
    }

    /// Point of Control: the price bucket with maximum volume. Ties break
    /// toward the lowest price (deterministic).
    pub fn poc(&self) -> Result<f64, ProfileError> {
        let mut best: Option<(i64, f64)> = None;
        // Ascending iteration + strict improvement keeps the lowest price
        // among equal-volume buckets.
        for (&idx, &vol) in &self.buckets {
            match best {
                Some((_, best_vol)) if vol <= best_vol => {}
                _ => best = Some((idx, vol)),
            }
        }
        best.map(|(idx, _)| self.price_of(idx))
            .ok_or(ProfileError::Empty)
    }

    /// Value area holding `target_fraction` of total volume, expanded
    /// greedily from POC by adding whichever adjacent bucket has more
    /// volume. Equal volume expands downward (toward VAL).
    pub fn value_area(&self, target_fraction: f64) -> Result<ValueArea, ProfileError> {
        assert!(
            (0.0..=1.0).contains(&target_fraction),
            "target_fraction must be within [0, 1]"
        );

        let sorted = self.sorted_buckets();
        if sorted.is_empty() {
            return Err(ProfileError::Empty);
        }

        let total: f64 = sorted.iter().map(|&(_, v)| v).sum();
        if total <= 0.0 {
            return Err(ProfileError::Empty);
        }

        // POC position within the sorted vec (lowest price on ties).
        let poc_pos = sorted
            .iter()
            .enumerate()
            .fold(0usize, |best, (i, &(_, v))| {
                if v > sorted[best].1 {
                    i
                } else {
                    best
                }
            });

        let mut lo = poc_pos;
        let mut hi = poc_pos;
        let mut captured = sorted[poc_pos].1;
        let target = target_fraction * total;

        while captured < target && (lo > 0 || hi + 1 < sorted.len()) {
            let below = if lo > 0 { Some(sorted[lo - 1].1) } else { None };
            let above = if hi + 1 < sorted.len() {
                Some(sorted[hi + 1].1)
            } else {
                None
            };

            match (below, above) {
                // Ties expand downward.
                (Some(b), Some(a)) if b >= a => {
                    lo -= 1;
                    captured += b;
                }
                (_, Some(a)) => {
                    hi += 1;
                    captured += a;
                }
                (Some(b), None) => {
                    lo -= 1;
                    captured += b;
                }
                (None, None) => unreachable!("loop condition guarantees a neighbor"),
            }
        }

        Ok(ValueArea {
            low: self.price_of(sorted[lo].0),
            high: self.price_of(sorted[hi].0),
            volume_fraction: captured / total,
        })
    }

    /// High Volume Nodes: local volume maxima whose volume exceeds
    /// `significance_multiplier` times the mean bucket volume. POC is
    /// excluded (it is reported separately).
    pub fn hvn_levels(&self, significance_multiplier: f64) -> Result<Vec<f64>, ProfileError> {
        let sorted = self.sorted_buckets();
        if sorted.is_empty() {
            return Err(ProfileError::Empty);
        }

        let mean = sorted.iter().map(|&(_, v)| v).sum::<f64>() / sorted.len() as f64;
        let threshold = significance_multiplier * mean;
        let poc = self.poc()?;

        let mut levels = Vec::new();
        for i in 0..sorted.len() {
            let (idx, vol) = sorted[i];
            if vol <= threshold {
                continue;
            }
            let above_prev = i == 0 || vol > sorted[i - 1].1;
            let above_next = i + 1 == sorted.len() || vol > sorted[i + 1].1;
            if above_prev && above_next {
                let price = self.price_of(idx);
                if price != poc {
                    levels.push(price);
                }
            }
        }

        Ok(levels)
    }

    /// All structural levels — VAL, POC, VAH plus HVNs — sorted ascending,
    /// deduplicated. Input to the level calculator.
    pub fn structural_levels(&self) -> Result<Vec<f64>, ProfileError> {
        let poc = self.poc()?;
        let va = self.value_area(VALUE_AREA_FRACTION)?;
        let mut levels = vec![va.low, poc, va.high];
        levels.extend(self.hvn_levels(HVN_SIGNIFICANCE)?);
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TapeTrade, TradeSide};
    use chrono::{TimeZone, Utc};

    fn trade(price: f64, size: f64) -> TapeTrade {
        TapeTrade {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            price,
            size,
            side: TradeSide::Buy,
        }
    }

    fn profile_from(prints: &[(f64, f64)]) -> VolumeProfile {
        let mut builder = VolumeProfileBuilder::new(1.0).unwrap();
        for &(price, size) in prints {
            builder.add_trade(&trade(price, size));
        }
        builder.build()
    }

    #[test]
    fn empty_profile_rejects_queries() {
        let p = VolumeProfileBuilder::new(1.0).unwrap().build();
        assert!(p.is_empty());
        assert!(p.poc().is_err());
        assert!(p.value_area(0.7).is_err());
        assert!(p.hvn_levels(1.5).is_err());
        assert!(p.structural_levels().is_err());
    }

    #[test]
    fn poc_is_max_volume_bucket() {
        let p = profile_from(&[(100.0, 5.0), (101.0, 20.0), (102.0, 3.0)]);
        assert_eq!(p.poc().unwrap(), 101.0);
    }

    #[test]
    fn poc_tie_breaks_to_lowest_price() {
        let p = profile_from(&[(100.0, 10.0), (105.0, 10.0)]);
        assert_eq!(p.poc().unwrap(), 100.0);
    }

    #[test]
    fn value_area_contains_poc() {
        let p = profile_from(&[
            (98.0, 2.0),
            (99.0, 5.0),
            (100.0, 30.0),
            (101.0, 8.0),
            (102.0, 3.0),
        ]);
        let poc = p.poc().unwrap();
        let va = p.value_area(0.70).unwrap();
        assert!(va.low <= poc && poc <= va.high);
        assert!(va.volume_fraction >= 0.70);
    }

    #[test]
    fn value_area_expands_toward_heavier_side() {
        // Volume below POC dominates, so VAL should extend down first.
        let p = profile_from(&[
            (97.0, 15.0),
            (98.0, 18.0),
            (99.0, 19.0),
            (100.0, 30.0),
            (101.0, 1.0),
            (102.0, 1.0),
        ]);
        let va = p.value_area(0.70).unwrap();
        assert_eq!(va.high, 100.0);
        assert!(va.low <= 98.0);
    }

    #[test]
    fn value_area_equal_sides_expands_down() {
        let p = profile_from(&[(99.0, 10.0), (100.0, 20.0), (101.0, 10.0)]);
        // First expansion sees 10.0 on both sides → goes down.
        let va = p.value_area(0.74).unwrap();
        assert_eq!(va.low, 99.0);
        assert_eq!(va.high, 100.0);
    }

    #[test]
    fn value_area_whole_profile_when_target_is_one() {
        let p = profile_from(&[(99.0, 1.0), (100.0, 1.0), (101.0, 1.0)]);
        let va = p.value_area(1.0).unwrap();
        assert_eq!(va.low, 99.0);
        assert_eq!(va.high, 101.0);
        assert!((va.volume_fraction - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hvn_finds_secondary_peak() {
        // Peaks at 100 (POC) and 105; 105 is the HVN.
        let p = profile_from(&[
            (99.0, 2.0),
            (100.0, 30.0),
            (101.0, 2.0),
            (104.0, 3.0),
            (105.0, 20.0),
            (106.0, 2.0),
        ]);
        let hvns = p.hvn_levels(1.5).unwrap();
        assert_eq!(hvns, vec![105.0]);
    }

    #[test]
    fn hvn_excludes_insignificant_peaks() {
        let p = profile_from(&[
            (99.0, 9.0),
            (100.0, 10.0),
            (101.0, 9.0),
            (105.0, 10.5), // local max but barely above mean
        ]);
        let hvns = p.hvn_levels(1.5).unwrap();
        assert!(hvns.is_empty());
    }

    #[test]
    fn structural_levels_sorted_and_deduped() {
        let p = profile_from(&[
            (98.0, 2.0),
            (99.0, 5.0),
            (100.0, 30.0),
            (101.0, 8.0),
            (102.0, 3.0),
        ]);
        let levels = p.structural_levels().unwrap();
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
        assert!(levels.contains(&100.0));
    }

    #[test]
    fn volume_at_uses_tick_bucketing() {
        let p = profile_from(&[(100.2, 5.0), (99.8, 3.0)]);
        // Both prints round to the 100 bucket at tick 1.0.
        assert_eq!(p.volume_at(100.0), 8.0);
    }
}
