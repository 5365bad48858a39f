//! Domain types: candles, signals, strategy config, account context,
//! trade plans, positions.

pub mod account;
pub mod candle;
pub mod plan;
pub mod position;
pub mod signal;
pub mod strategy;

pub use account::{AccountContext, Goal, PaceStatus};
pub use candle::{Candle, TapeTrade, TradeSide};
pub use plan::{TradeAction, TradePlan};
pub use position::{ClosedTrade, ExitReason, Position};
pub use signal::{Direction, Signal, SignalKind};
pub use strategy::{RiskConfig, Strategy};
