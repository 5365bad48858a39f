//! Positions and closed trades for the backtest/paper-trading layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Direction;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalExit,
    EndOfData,
}

/// An open position. Created on entry, mutated only by trailing-stop
/// updates, converted to a `ClosedTrade` on exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub side: Direction,
    pub entry_price: f64,
    /// Quantity in coin units.
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Unrealized PnL marked at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.side {
            Direction::Long => (price - self.entry_price) * self.size,
            Direction::Short => (self.entry_price - price) * self.size,
        }
    }
}

/// An immutable record of a completed round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub coin: String,
    pub side: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub exit_reason: ExitReason,
}

impl ClosedTrade {
    /// Close out a position at `price`.
    pub fn from_position(
        position: &Position,
        exit_price: f64,
        closed_at: DateTime<Utc>,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            coin: position.coin.clone(),
            side: position.side,
            entry_price: position.entry_price,
            exit_price,
            size: position.size,
            pnl: position.unrealized_pnl(exit_price),
            opened_at: position.opened_at,
            closed_at,
            exit_reason,
        }
    }
}
