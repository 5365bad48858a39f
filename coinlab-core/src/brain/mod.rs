//! Decision engine — turns pending signals into a `TradePlan`.
//!
//! Three phases, strictly ordered:
//!
//!   A. scoring  — pure weighted sum over pending signals (direction)
//!   B. levels   — structure-aware stop/target placement
//!   C. sizing   — advisory multiplier, bounded to [0.5, 2.0]
//!
//! The advisor is consulted only after Phase A has fixed a direction and
//! Phase B the levels; it can scale `size_pct` and nothing else. A
//! misbehaving advisor therefore cannot flip a decision or move a stop.

pub mod advisor;
pub mod scoring;
pub mod sizing;

pub use advisor::{Advisor, AdvisoryRequest, AdvisoryResponse, HttpAdvisor, NullAdvisor};
pub use scoring::ScoreDecision;

use tracing::{debug, info};

use crate::domain::{AccountContext, Candle, Direction, Signal, Strategy, TradeAction, TradePlan};
use crate::error::ConfigError;
use crate::indicators::atr;
use crate::levels::LevelCalculator;
use crate::profile::VolumeProfile;

/// ATR period used for level placement.
const LEVEL_ATR_PERIOD: usize = 14;

pub struct SignalBrain<A: Advisor> {
    strategy: Strategy,
    levels: LevelCalculator,
    advisor: A,
}

impl<A: Advisor> SignalBrain<A> {
    /// Build a brain from a validated strategy. Construction fails rather
    /// than letting a bad configuration reach a decision cycle.
    pub fn new(strategy: Strategy, advisor: A) -> Result<Self, ConfigError> {
        strategy.validate()?;
        let levels = LevelCalculator::from_risk(&strategy.risk);
        Ok(Self {
            strategy,
            levels,
            advisor,
        })
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Decide what to do for `coin` given the candle window, the signals
    /// pending for it, and an optional volume profile for level placement.
    pub fn decide(
        &self,
        coin: &str,
        candles: &[Candle],
        signals: &[Signal],
        profile: Option<&VolumeProfile>,
        account: &AccountContext,
    ) -> TradePlan {
        if signals.is_empty() {
            debug!(coin, "wait: no signals emitted");
            return TradePlan::wait(coin, "no signals emitted");
        }

        // Phase A: direction from pure scoring.
        let score = scoring::decide(signals, &self.strategy);
        let Some(direction) = score.direction else {
            let reason = format!(
                "no directional edge (long={:.3}, short={:.3}, threshold={:.3})",
                score.long_score, score.short_score, self.strategy.direction_threshold
            );
            debug!(coin, long = score.long_score, short = score.short_score, "wait: {reason}");
            return TradePlan::wait(coin, reason);
        };

        // Phase B: levels. Without a price or volatility estimate the
        // decision degrades to Wait, never to an unleveled entry.
        let Some(last) = candles.last() else {
            return TradePlan::wait(coin, "no candle data");
        };
        let price = last.close;
        let Some(atr) = atr(candles, LEVEL_ATR_PERIOD) else {
            debug!(coin, "wait: insufficient data for ATR");
            return TradePlan::wait(coin, "insufficient data for ATR");
        };
        let Some(levels) = self.levels.compute(direction, price, profile, atr) else {
            debug!(coin, atr, "wait: no usable volatility estimate");
            return TradePlan::wait(coin, "no usable volatility estimate");
        };

        // Phase C: sizing. The only phase that sees the advisor.
        let request = AdvisoryRequest {
            coin: coin.to_string(),
            direction,
            score: score.winning_score(),
            entry_price: price,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            account: account.clone(),
        };
        let multiplier = sizing::resolve_multiplier(&self.advisor, &request);
        let size_pct = sizing::position_size_pct(&self.strategy.risk, multiplier);

        let kinds: Vec<&str> = score.contributing.iter().map(|k| k.as_str()).collect();
        let reason = format!(
            "{direction} score {:.3} from [{}]; stop {:.4} ({:?}), target {:.4} ({:?}), size {:.2}% (x{multiplier:.2})",
            score.winning_score(),
            kinds.join(", "),
            levels.stop_loss,
            levels.stop_source,
            levels.take_profit,
            levels.target_source,
            size_pct * 100.0,
        );
        info!(
            coin,
            %direction,
            confidence = score.winning_score(),
            stop = levels.stop_loss,
            target = levels.take_profit,
            size_pct,
            "entry planned"
        );

        TradePlan {
            coin: coin.to_string(),
            action: match direction {
                Direction::Long => TradeAction::EnterLong,
                Direction::Short => TradeAction::EnterShort,
            },
            confidence: score.winning_score(),
            stop_loss: Some(levels.stop_loss),
            take_profit: Some(levels.take_profit),
            size_pct,
            reason,
        }
    }
}
