//! Walk-forward backtesting: the engine plus trailing-stop management.

pub mod engine;
pub mod trailing;

pub use engine::{BacktestEngine, BacktestRun};
pub use trailing::TrailingStop;
