//! Confirmed swing-point extraction for divergence detection.
//!
//! A pivot low at bar `p` is confirmed only once `confirm` bars on each
//! side are worse: left neighbors must be >= (equal allowed) and right
//! neighbors strictly greater. With equal extrema inside one window this
//! makes the most recent bar the pivot — the earlier bar's right side
//! contains an equal value and fails the strict check. Mirror rules for
//! pivot highs. Comparing confirmed pivots (not raw ticks) is what keeps
//! divergence detection from firing on noise.

/// A confirmed local extremum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    /// Index into the series the pivot was extracted from.
    pub index: usize,
    pub value: f64,
}

/// Confirmed pivot lows, in index order.
pub fn confirmed_swing_lows(values: &[f64], confirm: usize) -> Vec<SwingPoint> {
    assert!(confirm >= 1, "confirmation window must be >= 1");
    let n = values.len();
    let mut pivots = Vec::new();

    for i in confirm..n.saturating_sub(confirm) {
        let v = values[i];
        if v.is_nan() {
            continue;
        }
        let left_ok = values[i - confirm..i].iter().all(|&x| !x.is_nan() && x >= v);
        let right_ok = values[i + 1..=i + confirm].iter().all(|&x| !x.is_nan() && x > v);
        if left_ok && right_ok {
            pivots.push(SwingPoint { index: i, value: v });
        }
    }

    pivots
}

/// Confirmed pivot highs, in index order.
pub fn confirmed_swing_highs(values: &[f64], confirm: usize) -> Vec<SwingPoint> {
    assert!(confirm >= 1, "confirmation window must be >= 1");
    let n = values.len();
    let mut pivots = Vec::new();

    for i in confirm..n.saturating_sub(confirm) {
        let v = values[i];
        if v.is_nan() {
            continue;
        }
        let left_ok = values[i - confirm..i].iter().all(|&x| !x.is_nan() && x <= v);
        let right_ok = values[i + 1..=i + confirm].iter().all(|&x| !x.is_nan() && x < v);
        if left_ok && right_ok {
            pivots.push(SwingPoint { index: i, value: v });
        }
    }

    pivots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_pivot_low() {
        let values = [5.0, 4.0, 3.0, 4.0, 5.0];
        let pivots = confirmed_swing_lows(&values, 2);
        assert_eq!(pivots, vec![SwingPoint { index: 2, value: 3.0 }]);
    }

    #[test]
    fn finds_simple_pivot_high() {
        let values = [1.0, 2.0, 3.0, 2.0, 1.0];
        let pivots = confirmed_swing_highs(&values, 2);
        assert_eq!(pivots, vec![SwingPoint { index: 2, value: 3.0 }]);
    }

    #[test]
    fn unconfirmed_extremum_at_edge_is_skipped() {
        // The minimum sits at the last index — no right-side confirmation.
        let values = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!(confirmed_swing_lows(&values, 2).is_empty());
    }

    #[test]
    fn equal_extrema_resolve_to_most_recent() {
        // Two equal lows at indices 2 and 4. Index 2's right side contains
        // an equal value (fails strict >), index 4's left side allows it.
        let values = [5.0, 4.0, 3.0, 4.0, 3.0, 4.0, 5.0];
        let pivots = confirmed_swing_lows(&values, 2);
        assert_eq!(pivots.len(), 1);
        assert_eq!(pivots[0].index, 4);
    }

    #[test]
    fn multiple_pivots_in_index_order() {
        let values = [5.0, 3.0, 5.0, 6.0, 5.0, 2.0, 5.0, 6.0];
        let pivots = confirmed_swing_lows(&values, 1);
        let indices: Vec<usize> = pivots.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 5]);
    }

    #[test]
    fn nan_in_window_blocks_confirmation() {
        let values = [5.0, f64::NAN, 3.0, 4.0, 5.0];
        assert!(confirmed_swing_lows(&values, 2).is_empty());
    }

    #[test]
    fn too_short_series_yields_nothing() {
        assert!(confirmed_swing_lows(&[1.0, 2.0], 2).is_empty());
        assert!(confirmed_swing_highs(&[], 1).is_empty());
    }
}
