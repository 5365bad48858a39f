//! Structure-aware stop and target placement.
//!
//! Stops and targets snap to volume-profile structure (value-area edges,
//! POC, high-volume nodes) when a usable level exists near the entry;
//! otherwise they fall back to plain ATR multiples. A structural stop
//! further than `max_structural_atr_multiple` ATRs away is rejected —
//! hiding a stop behind structure is worthless if it risks three times
//! the intended amount.

use crate::domain::{Direction, RiskConfig};
use crate::profile::VolumeProfile;

/// Where a stop or target level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    /// Snapped to a volume-profile level.
    Structural,
    /// Plain ATR multiple of the entry price.
    AtrFallback,
}

/// Stop and target for a prospective entry, with provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_source: LevelSource,
    pub target_source: LevelSource,
}

#[derive(Debug, Clone)]
pub struct LevelCalculator {
    stop_atr_multiple: f64,
    target_atr_multiple: f64,
    max_structural_atr_multiple: f64,
}

impl LevelCalculator {
    pub fn new(stop_atr_multiple: f64, target_atr_multiple: f64, max_structural_atr_multiple: f64) -> Self {
        assert!(stop_atr_multiple > 0.0, "stop multiple must be > 0");
        assert!(target_atr_multiple > 0.0, "target multiple must be > 0");
        assert!(
            max_structural_atr_multiple >= stop_atr_multiple,
            "structural cap must not be tighter than the ATR stop"
        );
        Self {
            stop_atr_multiple,
            target_atr_multiple,
            max_structural_atr_multiple,
        }
    }

    pub fn from_risk(risk: &RiskConfig) -> Self {
        Self::new(
            risk.stop_atr_multiple,
            risk.target_atr_multiple,
            risk.max_structural_atr_multiple,
        )
    }

    /// Compute stop and target for an entry at `price`.
    ///
    /// Returns None when ATR is non-positive or not finite — without a
    /// volatility estimate no sane level can be placed.
    pub fn compute(
        &self,
        direction: Direction,
        price: f64,
        profile: Option<&VolumeProfile>,
        atr: f64,
    ) -> Option<TradeLevels> {
        if !(atr > 0.0) || !atr.is_finite() || !(price > 0.0) {
            return None;
        }

        let levels = profile
            .and_then(|p| p.structural_levels().ok())
            .unwrap_or_default();

        let (stop_loss, stop_source) = self.stop(direction, price, &levels, atr);
        let (take_profit, target_source) = self.target(direction, price, &levels, atr);

        Some(TradeLevels {
            stop_loss,
            take_profit,
            stop_source,
            target_source,
        })
    }

    /// Stop goes just beyond the nearest structural level on the adverse
    /// side of the entry, capped at `max_structural_atr_multiple` ATRs.
    fn stop(&self, direction: Direction, price: f64, levels: &[f64], atr: f64) -> (f64, LevelSource) {
        let fallback = match direction {
            Direction::Long => price - self.stop_atr_multiple * atr,
            Direction::Short => price + self.stop_atr_multiple * atr,
        };

        let structural = match direction {
            // Nearest level strictly below the entry.
            Direction::Long => levels
                .iter()
                .copied()
                .filter(|&l| l < price)
                .fold(None::<f64>, |acc, l| Some(acc.map_or(l, |a| a.max(l)))),
            // Nearest level strictly above the entry.
            Direction::Short => levels
                .iter()
                .copied()
                .filter(|&l| l > price)
                .fold(None::<f64>, |acc, l| Some(acc.map_or(l, |a| a.min(l)))),
        };

        match structural {
            Some(level) if (level - price).abs() <= self.max_structural_atr_multiple * atr => {
                // A hair past the level so a touch does not stop us out.
                let pad = 0.1 * atr;
                let stop = match direction {
                    Direction::Long => level - pad,
                    Direction::Short => level + pad,
                };
                (stop, LevelSource::Structural)
            }
            _ => (fallback, LevelSource::AtrFallback),
        }
    }

    /// Target snaps to the nearest structural level on the favorable side
    /// that is at least one ATR stop-multiple away (a target closer than
    /// the risk unit is not worth taking).
    fn target(&self, direction: Direction, price: f64, levels: &[f64], atr: f64) -> (f64, LevelSource) {
        let fallback = match direction {
            Direction::Long => price + self.target_atr_multiple * atr,
            Direction::Short => price - self.target_atr_multiple * atr,
        };
        let min_distance = self.stop_atr_multiple * atr;

        let structural = match direction {
            Direction::Long => levels
                .iter()
                .copied()
                .filter(|&l| l >= price + min_distance)
                .fold(None::<f64>, |acc, l| Some(acc.map_or(l, |a| a.min(l)))),
            Direction::Short => levels
                .iter()
                .copied()
                .filter(|&l| l <= price - min_distance)
                .fold(None::<f64>, |acc, l| Some(acc.map_or(l, |a| a.max(l)))),
        };

        match structural {
            Some(level) => (level, LevelSource::Structural),
            None => (fallback, LevelSource::AtrFallback),
        }
    }
}
