//! Account context — the balance/goal snapshot handed to the advisory
//! capability.
//!
//! Constructed fresh per decision call, never mutated after construction.
//! Pace status informs the position-size multiplier request only; it has
//! no bearing on direction.

use serde::{Deserialize, Serialize};

/// A balance target over a fixed number of days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub start_balance: f64,
    pub target_balance: f64,
    pub target_days: f64,
    pub elapsed_days: f64,
}

/// Qualitative comparison of goal progress vs elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    JustStarted,
    Ahead,
    OnPace,
    Behind,
    GoalReached,
}

/// Snapshot of account state passed into the advisory capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountContext {
    pub balance: f64,
    pub goal: Option<Goal>,
    pub goal_progress_pct: f64,
    pub time_progress_pct: f64,
    pub pace_status: PaceStatus,
    pub required_daily_return_pct: f64,
}

/// Progress must lead elapsed time by this many points to count as Ahead
/// (and trail by the same to count as Behind).
const PACE_TOLERANCE_PCT: f64 = 10.0;

/// Below this much elapsed time the pace comparison is meaningless.
const JUST_STARTED_TIME_PCT: f64 = 5.0;

impl AccountContext {
    /// Derive the full context from a balance and an optional goal.
    pub fn derive(balance: f64, goal: Option<Goal>) -> Self {
        let Some(g) = goal else {
            return Self {
                balance,
                goal: None,
                goal_progress_pct: 0.0,
                time_progress_pct: 0.0,
                pace_status: PaceStatus::JustStarted,
                required_daily_return_pct: 0.0,
            };
        };

        let growth_needed = g.target_balance - g.start_balance;
        let goal_progress_pct = if growth_needed > 0.0 {
            ((balance - g.start_balance) / growth_needed * 100.0).max(0.0)
        } else {
            100.0
        };
        let time_progress_pct = if g.target_days > 0.0 {
            (g.elapsed_days / g.target_days * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let pace_status = if goal_progress_pct >= 100.0 {
            PaceStatus::GoalReached
        } else if time_progress_pct < JUST_STARTED_TIME_PCT {
            PaceStatus::JustStarted
        } else if goal_progress_pct >= time_progress_pct + PACE_TOLERANCE_PCT {
            PaceStatus::Ahead
        } else if goal_progress_pct + PACE_TOLERANCE_PCT >= time_progress_pct {
            PaceStatus::OnPace
        } else {
            PaceStatus::Behind
        };

        let remaining_days = (g.target_days - g.elapsed_days).max(0.0);
        let required_daily_return_pct = if pace_status == PaceStatus::GoalReached
            || remaining_days < 1.0
            || balance <= 0.0
            || g.target_balance <= balance
        {
            0.0
        } else {
            ((g.target_balance / balance).powf(1.0 / remaining_days) - 1.0) * 100.0
        };

        Self {
            balance,
            goal: Some(g),
            goal_progress_pct,
            time_progress_pct,
            pace_status,
            required_daily_return_pct,
        }
    }
}
