//! Per-detector cooldown state.
//!
//! After a detector emits a signal, the same direction is suppressed for a
//! configurable number of bar evaluations — noisy oscillation around a
//! threshold must not spam signals. The opposite direction is unaffected.
//! State is detector-local and reset only by explicit `reset`.

use crate::domain::Direction;

#[derive(Debug, Clone)]
pub struct Cooldown {
    bars: usize,
    /// Evaluation counter; advanced once per detector evaluation (one bar).
    evals: u64,
    last_long: Option<u64>,
    last_short: Option<u64>,
}

impl Cooldown {
    pub fn new(bars: usize) -> Self {
        Self {
            bars,
            evals: 0,
            last_long: None,
            last_short: None,
        }
    }

    /// Advance the evaluation counter. Call exactly once per `detect`.
    pub fn tick(&mut self) {
        self.evals += 1;
    }

    /// True when `direction` may be emitted at the current evaluation.
    pub fn permits(&self, direction: Direction) -> bool {
        let last = match direction {
            Direction::Long => self.last_long,
            Direction::Short => self.last_short,
        };
        match last {
            None => true,
            Some(at) => self.evals.saturating_sub(at) > self.bars as u64,
        }
    }

    /// Record an emission for `direction` at the current evaluation.
    pub fn record(&mut self, direction: Direction) {
        match direction {
            Direction::Long => self.last_long = Some(self.evals),
            Direction::Short => self.last_short = Some(self.evals),
        }
    }

    pub fn reset(&mut self) {
        self.evals = 0;
        self.last_long = None;
        self.last_short = None;
    }
}
