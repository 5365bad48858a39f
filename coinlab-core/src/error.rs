//! Error taxonomy.
//!
//! Only `ConfigError` is fatal: a bad strategy must be rejected before any
//! decision cycle runs. Everything else is per-bar, per-coin and
//! recoverable — a data gap or a misbehaving advisor never aborts other
//! coins or bars.

use crate::domain::SignalKind;

/// Invalid strategy/engine configuration. Fatal at load time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("direction_threshold must be > 0, got {value}")]
    NonPositiveThreshold { value: f64 },

    #[error("min_signal_strength must be within [0, 1], got {value}")]
    StrengthOutOfRange { value: f64 },

    #[error("weight for signal kind '{kind}' must be non-negative, got {weight}")]
    NegativeWeight { kind: SignalKind, weight: f64 },

    #[error("base_size_pct must be in (0, max_size_pct] with max_size_pct <= 1, got base={base}, max={max}")]
    BadSizePct { base: f64, max: f64 },

    #[error("target_atr_multiple ({target}) must exceed stop_atr_multiple ({stop}), both > 0")]
    BadRewardRisk { stop: f64, target: f64 },

    #[error("max_structural_atr_multiple ({cap}) must be at least stop_atr_multiple ({stop})")]
    BadStructuralCap { stop: f64, cap: f64 },

    #[error("trailing_stop_pct must be within (0, 1), got {value}")]
    BadTrailingPct { value: f64 },

    #[error("tick_size must be > 0, got {value}")]
    BadTickSize { value: f64 },
}

/// Advisory-capability failures. Non-fatal: the decision proceeds with
/// multiplier 1.0. `Timeout` and `Malformed` are distinguished for
/// observability only.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisory request timed out")]
    Timeout,

    #[error("malformed advisory response: {0}")]
    Malformed(String),

    #[error("advisory transport failure: {0}")]
    Transport(String),
}

/// Volume profile queries on a profile with no accumulated volume.
/// The level calculator treats this as the documented ATR fallback path,
/// not as an error.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("volume profile is empty")]
    Empty,
}
