//! TradePlan — the engine's sole output type.

use serde::{Deserialize, Serialize};

/// What the engine wants done. `Wait` covers both "no edge found" and
/// "insufficient data"; the `reason` string distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    EnterLong,
    EnterShort,
    /// Close the open position. Emitted toward live-execution consumers
    /// of serialized plans; the backtest engine handles opposing-signal
    /// exits internally and never constructs it.
    Exit,
    Wait,
}

/// A fully specified, directionally-decided, sized, leveled trade proposal
/// (or a Wait). Immutable once constructed; consumed by execution layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub coin: String,
    pub action: TradeAction,
    /// Winning weighted score from Phase A; 0.0 for Wait plans.
    pub confidence: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    /// Fraction of balance to commit, post-multiplier. 0.0 for Wait.
    pub size_pct: f64,
    /// Human-readable trace of which signals/levels drove the decision.
    pub reason: String,
}

impl TradePlan {
    /// A Wait plan with no levels and no size.
    pub fn wait(coin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            coin: coin.into(),
            action: TradeAction::Wait,
            confidence: 0.0,
            stop_loss: None,
            take_profit: None,
            size_pct: 0.0,
            reason: reason.into(),
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.action, TradeAction::EnterLong | TradeAction::EnterShort)
    }
}
