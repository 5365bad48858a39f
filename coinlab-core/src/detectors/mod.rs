//! Signal detectors — stateful pattern recognizers over candle windows.
//!
//! Each detector evaluates the most recent window of candles and emits
//! zero-or-one `Signal` per call. Detectors are stateful across calls
//! (cooldown timers), but every call is independent of other detectors.
//! Detector state is per coin: the aggregator owns one detector set per
//! coin, so no cross-coin synchronization exists.
//!
//! The detector set is a closed enum — adding a pattern family means
//! adding a variant, not registering a subclass.

pub mod cooldown;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod swing;
pub mod volume_profile;

pub use cooldown::Cooldown;
pub use macd::MacdDetector;
pub use momentum::MomentumDetector;
pub use rsi::RsiDetector;
pub use swing::{confirmed_swing_highs, confirmed_swing_lows, SwingPoint};
pub use volume_profile::VolumeProfileDetector;

use crate::domain::{Candle, Signal, SignalKind};

/// Default cooldown window, in bars.
pub const DEFAULT_COOLDOWN_BARS: usize = 10;

/// Shared detector contract.
///
/// `detect` must only use the candles it is given — the caller guarantees
/// `candles` never contains future bars. Emitting nothing is the normal
/// case, not an error.
pub trait SignalDetector {
    fn kind(&self) -> SignalKind;

    /// Bars of history needed before this detector can produce output.
    fn warmup_bars(&self) -> usize;

    /// Evaluate the trailing candle window. At most one signal per call.
    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal>;

    /// Clear cooldown and history state.
    fn reset(&mut self);
}

/// Closed set of detector kinds, one variant per pattern family.
#[derive(Debug, Clone)]
pub enum Detector {
    Momentum(MomentumDetector),
    Rsi(RsiDetector),
    Macd(MacdDetector),
    VolumeProfile(VolumeProfileDetector),
}

impl Detector {
    /// Build a detector with default parameters for `kind`.
    pub fn from_kind(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Momentum => Detector::Momentum(MomentumDetector::default_params()),
            SignalKind::Rsi => Detector::Rsi(RsiDetector::default_params()),
            SignalKind::Macd => Detector::Macd(MacdDetector::default_params()),
            SignalKind::VolumeProfile => {
                Detector::VolumeProfile(VolumeProfileDetector::default_params())
            }
        }
    }

    /// The full default detector set, one of each family.
    pub fn default_set() -> Vec<Detector> {
        SignalKind::ALL.iter().map(|&k| Detector::from_kind(k)).collect()
    }
}

impl SignalDetector for Detector {
    fn kind(&self) -> SignalKind {
        match self {
            Detector::Momentum(d) => d.kind(),
            Detector::Rsi(d) => d.kind(),
            Detector::Macd(d) => d.kind(),
            Detector::VolumeProfile(d) => d.kind(),
        }
    }

    fn warmup_bars(&self) -> usize {
        match self {
            Detector::Momentum(d) => d.warmup_bars(),
            Detector::Rsi(d) => d.warmup_bars(),
            Detector::Macd(d) => d.warmup_bars(),
            Detector::VolumeProfile(d) => d.warmup_bars(),
        }
    }

    fn detect(&mut self, coin: &str, candles: &[Candle]) -> Option<Signal> {
        match self {
            Detector::Momentum(d) => d.detect(coin, candles),
            Detector::Rsi(d) => d.detect(coin, candles),
            Detector::Macd(d) => d.detect(coin, candles),
            Detector::VolumeProfile(d) => d.detect(coin, candles),
        }
    }

    fn reset(&mut self) {
        match self {
            Detector::Momentum(d) => d.reset(),
            Detector::Rsi(d) => d.reset(),
            Detector::Macd(d) => d.reset(),
            Detector::VolumeProfile(d) => d.reset(),
        }
    }
}
