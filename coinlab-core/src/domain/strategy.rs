//! Strategy — the immutable configuration that drives the decision engine.
//!
//! Loaded once, validated at load time, read-only thereafter. There is no
//! process-wide registry: a `Strategy` value is passed explicitly into the
//! decision engine constructor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::SignalKind;
use crate::error::ConfigError;

/// Risk parameters for sizing and level placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Base position size as a fraction of balance (e.g. 0.05 = 5%).
    pub base_size_pct: f64,
    /// Hard cap on the final size fraction, post-multiplier.
    pub max_size_pct: f64,
    /// Stop distance in ATRs when no structural level is usable.
    pub stop_atr_multiple: f64,
    /// Target distance in ATRs when no structural level is usable.
    /// Must exceed `stop_atr_multiple` (minimum reward:risk).
    pub target_atr_multiple: f64,
    /// Structural levels farther than this many ATRs are clamped to an
    /// ATR-based distance instead.
    pub max_structural_atr_multiple: f64,
    /// Trailing stop distance as a fraction of price; None disables trailing.
    pub trailing_stop_pct: Option<f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_size_pct: 0.05,
            max_size_pct: 0.25,
            stop_atr_multiple: 1.5,
            target_atr_multiple: 3.0,
            max_structural_atr_multiple: 4.0,
            trailing_stop_pct: None,
        }
    }
}

/// A named scoring strategy: signal weights, thresholds, risk parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    /// Weight per signal family. A missing entry means weight 0 (the
    /// family is ignored by scoring).
    pub signal_weights: BTreeMap<SignalKind, f64>,
    /// Minimum weighted score required to act on a direction.
    pub direction_threshold: f64,
    /// Signals weaker than this are discarded before weighting.
    pub min_signal_strength: f64,
    /// Require at least two distinct signal families agreeing.
    #[serde(default)]
    pub prefer_consensus: bool,
    #[serde(default)]
    pub risk: RiskConfig,
}

impl Strategy {
    /// A balanced default: all four families weighted equally.
    pub fn balanced(name: impl Into<String>) -> Self {
        let mut weights = BTreeMap::new();
        for kind in SignalKind::ALL {
            weights.insert(kind, 1.0);
        }
        Self {
            name: name.into(),
            signal_weights: weights,
            direction_threshold: 0.5,
            min_signal_strength: 0.2,
            prefer_consensus: false,
            risk: RiskConfig::default(),
        }
    }

    /// Weight for a signal family; missing entries score zero.
    pub fn weight(&self, kind: SignalKind) -> f64 {
        self.signal_weights.get(&kind).copied().unwrap_or(0.0)
    }

    /// Validate the configuration. Fatal at load time — invalid strategies
    /// must never reach a decision cycle, and values are never coerced.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.direction_threshold > 0.0) {
            return Err(ConfigError::NonPositiveThreshold {
                value: self.direction_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.min_signal_strength) {
            return Err(ConfigError::StrengthOutOfRange {
                value: self.min_signal_strength,
            });
        }
        for (&kind, &weight) in &self.signal_weights {
            if !(weight >= 0.0) {
                return Err(ConfigError::NegativeWeight { kind, weight });
            }
        }
        let risk = &self.risk;
        if !(risk.base_size_pct > 0.0 && risk.base_size_pct <= risk.max_size_pct) {
            return Err(ConfigError::BadSizePct {
                base: risk.base_size_pct,
                max: risk.max_size_pct,
            });
        }
        if !(risk.max_size_pct <= 1.0) {
            return Err(ConfigError::BadSizePct {
                base: risk.base_size_pct,
                max: risk.max_size_pct,
            });
        }
        if !(risk.stop_atr_multiple > 0.0) || !(risk.target_atr_multiple > risk.stop_atr_multiple) {
            return Err(ConfigError::BadRewardRisk {
                stop: risk.stop_atr_multiple,
                target: risk.target_atr_multiple,
            });
        }
        // A structural cap tighter than the ATR stop would leave the level
        // calculator no admissible stop at all.
        if !(risk.max_structural_atr_multiple >= risk.stop_atr_multiple) {
            return Err(ConfigError::BadStructuralCap {
                stop: risk.stop_atr_multiple,
                cap: risk.max_structural_atr_multiple,
            });
        }
        if let Some(trail) = risk.trailing_stop_pct {
            if !(trail > 0.0 && trail < 1.0) {
                return Err(ConfigError::BadTrailingPct { value: trail });
            }
        }
        Ok(())
    }
}
