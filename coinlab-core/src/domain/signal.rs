//! Signals — immutable market events emitted by detectors.
//!
//! A signal describes a detected market pattern, never a downstream
//! decision: it carries a direction and a [0, 1] strength, and the
//! metadata payload records which bar/level drove the detection for
//! explainability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Directional intent of a signal or a decided trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Closed set of signal families. Adding a detector means adding a variant
/// here — there is no open-ended registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Momentum,
    Rsi,
    Macd,
    VolumeProfile,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Momentum,
        SignalKind::Rsi,
        SignalKind::Macd,
        SignalKind::VolumeProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Momentum => "momentum",
            SignalKind::Rsi => "rsi",
            SignalKind::Macd => "macd",
            SignalKind::VolumeProfile => "volume_profile",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable market event emitted by a signal detector.
///
/// Metadata keys are detector-specific (e.g. `divergence_pivot_price`,
/// `value_area_low`) and exist purely for explainability downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub coin: String,
    pub kind: SignalKind,
    pub direction: Direction,
    /// Signal strength (0.0 to 1.0, higher = stronger conviction).
    pub strength: f64,
    pub timestamp: DateTime<Utc>,
    /// Numeric annotations for explainability (which bar/level fired).
    pub metadata: BTreeMap<String, f64>,
}

impl Signal {
    /// Build a signal, clamping strength into [0, 1].
    pub fn new(
        coin: impl Into<String>,
        kind: SignalKind,
        direction: Direction,
        strength: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            coin: coin.into(),
            kind,
            direction,
            strength: strength.clamp(0.0, 1.0),
            timestamp,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: f64) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
