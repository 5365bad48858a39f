//! Walk-forward backtest engine.
//!
//! Strictly no look-ahead: on bar `t` every component sees only
//! `&candles[..=t]`. Per-bar order while a position is open: stop check,
//! take-profit check, trailing ratchet (re-checking the tightened stop),
//! then signal-driven exit. Entries fill at the decision bar's close;
//! one open position per coin. End of data force-closes so the equity
//! curve always reconciles with the trade list.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::aggregator::SignalAggregator;
use crate::backtest::trailing::TrailingStop;
use crate::brain::{Advisor, SignalBrain};
use crate::domain::{
    AccountContext, Candle, ClosedTrade, Direction, ExitReason, Goal, Position, TradeAction,
};
use crate::profile::builder::profile_from_candles;
use crate::profile::VolumeProfile;

/// Bars of signal recency fed to the brain each decision.
const SIGNAL_WINDOW_BARS: i32 = 5;

/// Trailing bars used to build the per-bar volume profile.
const DEFAULT_PROFILE_WINDOW: usize = 60;

/// Result of one backtest run.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub coin: String,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub trades: Vec<ClosedTrade>,
}

pub struct BacktestEngine<A: Advisor> {
    brain: SignalBrain<A>,
    aggregator: SignalAggregator,
    initial_balance: f64,
    profile_window: usize,
    profile_tick_size: f64,
    goal: Option<Goal>,
}

impl<A: Advisor> BacktestEngine<A> {
    pub fn new(brain: SignalBrain<A>, aggregator: SignalAggregator, initial_balance: f64) -> Self {
        assert!(initial_balance > 0.0, "initial_balance must be > 0");
        Self {
            brain,
            aggregator,
            initial_balance,
            profile_window: DEFAULT_PROFILE_WINDOW,
            profile_tick_size: 1.0,
            goal: None,
        }
    }

    /// Override the volume-profile window and price bucketing.
    pub fn with_profile(mut self, window: usize, tick_size: f64) -> Self {
        self.profile_window = window;
        self.profile_tick_size = tick_size;
        self
    }

    /// Attach a balance goal; elapsed days are derived from candle time.
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    fn profile_for(&self, candles: &[Candle]) -> Option<VolumeProfile> {
        let start = candles.len().saturating_sub(self.profile_window);
        profile_from_candles(&candles[start..], self.profile_tick_size)
            .ok()
            .filter(|p| !p.is_empty())
    }

    fn account_at(&self, balance: f64, start: DateTime<Utc>, now: DateTime<Utc>) -> AccountContext {
        let goal = self.goal.map(|mut g| {
            g.elapsed_days = (now - start).num_seconds() as f64 / 86_400.0;
            g
        });
        AccountContext::derive(balance, goal)
    }

    /// Run the full walk-forward over `candles`.
    pub fn run(&mut self, coin: &str, candles: &[Candle]) -> BacktestRun {
        let mut balance = self.initial_balance;
        let mut equity_curve = Vec::with_capacity(candles.len());
        let mut trades = Vec::new();
        let mut open: Option<(Position, Option<TrailingStop>)> = None;

        let start_ts = candles.first().map(|c| c.timestamp);
        // Recency window scales with the bar interval so the same engine
        // works on any timeframe.
        let bar_interval = match candles {
            [a, b, ..] => b.timestamp - a.timestamp,
            _ => Duration::minutes(1),
        };
        let signal_window = bar_interval * SIGNAL_WINDOW_BARS;

        for t in 0..candles.len() {
            let window = &candles[..=t];
            let bar = &candles[t];

            // Detector state advances every bar, position or not.
            self.aggregator.process_candle(coin, window);

            // One account snapshot per bar: the running balance and the
            // series clock, whether a position is open or not.
            let account = self.account_at(
                balance,
                start_ts.unwrap_or(bar.timestamp),
                bar.timestamp,
            );

            if let Some((position, trail)) = open.take() {
                match self.manage_open_bar(coin, window, position, trail, signal_window, &account) {
                    Ok(closed) => {
                        balance += closed.pnl;
                        trades.push(closed);
                    }
                    Err(still_open) => open = Some(still_open),
                }
            } else {
                let pending = self.aggregator.pending_signals(coin, bar.timestamp, signal_window);
                let profile = self.profile_for(window);
                let plan = self
                    .brain
                    .decide(coin, window, &pending, profile.as_ref(), &account);

                if plan.is_entry() && balance > 0.0 {
                    let side = match plan.action {
                        TradeAction::EnterLong => Direction::Long,
                        _ => Direction::Short,
                    };
                    let entry_price = bar.close;
                    let size = plan.size_pct * balance / entry_price;
                    let stop_loss = plan.stop_loss.unwrap_or(entry_price);
                    let position = Position {
                        coin: coin.to_string(),
                        side,
                        entry_price,
                        size,
                        stop_loss,
                        take_profit: plan.take_profit.unwrap_or(entry_price),
                        opened_at: bar.timestamp,
                    };
                    let trail = self
                        .brain
                        .strategy()
                        .risk
                        .trailing_stop_pct
                        .map(|pct| TrailingStop::new(side, pct, stop_loss));
                    info!(coin, %side, entry_price, stop_loss, "backtest entry");
                    open = Some((position, trail));
                }
            }

            let equity = balance
                + open
                    .as_ref()
                    .map_or(0.0, |(p, _)| p.unrealized_pnl(bar.close));
            equity_curve.push((bar.timestamp, equity));
        }

        // Force-close at the last bar so equity reconciles.
        if let Some((position, _)) = open {
            if let Some(last) = candles.last() {
                let closed = ClosedTrade::from_position(
                    &position,
                    last.close,
                    last.timestamp,
                    ExitReason::EndOfData,
                );
                balance += closed.pnl;
                trades.push(closed);
                if let Some(point) = equity_curve.last_mut() {
                    point.1 = balance;
                }
            }
        }

        BacktestRun {
            coin: coin.to_string(),
            initial_balance: self.initial_balance,
            final_balance: balance,
            equity_curve,
            trades,
        }
    }

    /// One bar of management for an open position. Ok(closed) when the
    /// position exited this bar, Err(position) when it stays open.
    #[allow(clippy::result_large_err)]
    fn manage_open_bar(
        &mut self,
        coin: &str,
        window: &[Candle],
        mut position: Position,
        mut trail: Option<TrailingStop>,
        signal_window: Duration,
        account: &AccountContext,
    ) -> Result<ClosedTrade, (Position, Option<TrailingStop>)> {
        let Some(bar) = window.last() else {
            return Err((position, trail));
        };
        let stop_hit = match position.side {
            Direction::Long => bar.low <= position.stop_loss,
            Direction::Short => bar.high >= position.stop_loss,
        };
        if stop_hit {
            debug!(coin, stop = position.stop_loss, "stop hit");
            return Ok(ClosedTrade::from_position(
                &position,
                position.stop_loss,
                bar.timestamp,
                ExitReason::StopLoss,
            ));
        }

        let target_hit = match position.side {
            Direction::Long => bar.high >= position.take_profit,
            Direction::Short => bar.low <= position.take_profit,
        };
        if target_hit {
            debug!(coin, target = position.take_profit, "target hit");
            return Ok(ClosedTrade::from_position(
                &position,
                position.take_profit,
                bar.timestamp,
                ExitReason::TakeProfit,
            ));
        }

        // Ratchet the trail off this close, then re-check the tightened
        // stop against the bar.
        if let Some(t) = trail.as_mut() {
            position.stop_loss = t.update(bar.close);
            let ratcheted_hit = match position.side {
                Direction::Long => bar.low <= position.stop_loss,
                Direction::Short => bar.high >= position.stop_loss,
            };
            if ratcheted_hit {
                return Ok(ClosedTrade::from_position(
                    &position,
                    position.stop_loss,
                    bar.timestamp,
                    ExitReason::StopLoss,
                ));
            }
        }

        // Opposing entry plan closes the position at the bar close.
        let pending = self.aggregator.pending_signals(coin, bar.timestamp, signal_window);
        if !pending.is_empty() {
            let profile = self.profile_for(window);
            let plan = self
                .brain
                .decide(coin, window, &pending, profile.as_ref(), account);
            let opposes = matches!(
                (position.side, plan.action),
                (Direction::Long, TradeAction::EnterShort)
                    | (Direction::Short, TradeAction::EnterLong)
            );
            if opposes {
                debug!(coin, "signal exit");
                return Ok(ClosedTrade::from_position(
                    &position,
                    bar.close,
                    bar.timestamp,
                    ExitReason::SignalExit,
                ));
            }
        }

        Err((position, trail))
    }
}
