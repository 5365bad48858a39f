//! Phase A: pure weighted scoring of pending signals.
//!
//! No I/O, no state, no advisory input — a slice of signals and a
//! strategy in, a `ScoreDecision` out. Everything downstream (levels,
//! sizing) runs only if this phase yields a direction.

use std::collections::BTreeSet;

use crate::domain::{Direction, Signal, SignalKind, Strategy};

/// Outcome of the scoring phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDecision {
    /// None when neither side clears the threshold, or on an exact tie.
    pub direction: Option<Direction>,
    pub long_score: f64,
    pub short_score: f64,
    /// Distinct signal kinds that contributed to the winning side.
    pub contributing: Vec<SignalKind>,
}

impl ScoreDecision {
    fn wait(long_score: f64, short_score: f64) -> Self {
        Self {
            direction: None,
            long_score,
            short_score,
            contributing: Vec::new(),
        }
    }

    /// The winning score, or 0.0 on Wait.
    pub fn winning_score(&self) -> f64 {
        match self.direction {
            Some(Direction::Long) => self.long_score,
            Some(Direction::Short) => self.short_score,
            None => 0.0,
        }
    }
}

/// Weighted-sum scoring rule.
///
/// Signals below the strategy's `min_signal_strength` floor are ignored.
/// Each surviving signal adds `weight(kind) * strength` to its side.
/// A side wins when its score clears `direction_threshold` AND strictly
/// exceeds the other side; an exact tie at or above the threshold is a
/// Wait (no directional edge, not a coin flip).
pub fn decide(signals: &[Signal], strategy: &Strategy) -> ScoreDecision {
    let mut long_score = 0.0;
    let mut short_score = 0.0;
    let mut long_kinds: BTreeSet<SignalKind> = BTreeSet::new();
    let mut short_kinds: BTreeSet<SignalKind> = BTreeSet::new();

    for signal in signals {
        if signal.strength < strategy.min_signal_strength {
            continue;
        }
        let contribution = strategy.weight(signal.kind) * signal.strength;
        if contribution <= 0.0 {
            continue;
        }
        match signal.direction {
            Direction::Long => {
                long_score += contribution;
                long_kinds.insert(signal.kind);
            }
            Direction::Short => {
                short_score += contribution;
                short_kinds.insert(signal.kind);
            }
        }
    }

    let threshold = strategy.direction_threshold;
    let (direction, kinds) = if long_score >= threshold && long_score > short_score {
        (Direction::Long, long_kinds)
    } else if short_score >= threshold && short_score > long_score {
        (Direction::Short, short_kinds)
    } else {
        return ScoreDecision::wait(long_score, short_score);
    };

    if strategy.prefer_consensus && kinds.len() < 2 {
        return ScoreDecision::wait(long_score, short_score);
    }

    ScoreDecision {
        direction: Some(direction),
        long_score,
        short_score,
        contributing: kinds.into_iter().collect(),
    }
}
