//! Trailing stop with a tighten-only ratchet.
//!
//! **Core rule:** stops may tighten, never loosen. A Long stop only
//! rises, a Short stop only falls — even when volatility expands and the
//! raw percent-trail would place the stop further away.

use crate::domain::Direction;

/// Per-position trailing state. Seeded with the initial stop so the
/// trail can never start looser than the entry stop.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingStop {
    side: Direction,
    /// Distance from price as a fraction (e.g. 0.02 trails 2% behind).
    trail_pct: f64,
    level: f64,
}

impl TrailingStop {
    pub fn new(side: Direction, trail_pct: f64, initial_stop: f64) -> Self {
        assert!(
            trail_pct > 0.0 && trail_pct < 1.0,
            "trail_pct must be within (0, 1)"
        );
        Self {
            side,
            trail_pct,
            level: initial_stop,
        }
    }

    /// Propose a new trail off `price` and ratchet it against the current
    /// level. Returns the (possibly unchanged) stop.
    pub fn update(&mut self, price: f64) -> f64 {
        let proposed = match self.side {
            Direction::Long => price * (1.0 - self.trail_pct),
            Direction::Short => price * (1.0 + self.trail_pct),
        };
        self.level = match self.side {
            Direction::Long => self.level.max(proposed),
            Direction::Short => self.level.min(proposed),
        };
        self.level
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}
