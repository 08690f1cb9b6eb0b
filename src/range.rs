//! Range membership and edge-distance classification
//!
//! A position is in range when the pool's current tick sits inside
//! `[tick_lower, tick_upper)`: the lower bound is inclusive and the upper
//! exclusive, matching how the AMM itself accrues fees only strictly below
//! the upper tick. Edge distance is defined only while in range: out of range is a
//! different condition from "exactly at the edge" and must not report 0%.

use serde::Serialize;

/// Where the current price sits relative to a position's range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeStatus {
    pub in_range: bool,
    /// Distance from the nearer range edge as a percentage of the range
    /// width (0 = sitting on an edge, 50 = dead center). `None` when out
    /// of range.
    pub edge_distance_percent: Option<f64>,
}

/// Classifies `current_tick` against `[tick_lower, tick_upper)`.
///
/// Callers must have validated `tick_lower < tick_upper`.
pub fn classify(tick_lower: i32, tick_upper: i32, current_tick: i32) -> RangeStatus {
    debug_assert!(tick_lower < tick_upper);

    let in_range = current_tick >= tick_lower && current_tick < tick_upper;
    if !in_range {
        return RangeStatus {
            in_range: false,
            edge_distance_percent: None,
        };
    }

    let width = (tick_upper - tick_lower) as f64;
    let dist_lower = (current_tick - tick_lower) as f64;
    let dist_upper = (tick_upper - current_tick) as f64;
    RangeStatus {
        in_range: true,
        edge_distance_percent: Some(100.0 * dist_lower.min(dist_upper) / width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_in_range() {
        let status = classify(-1000, 1000, 0);
        assert!(status.in_range);
        assert_eq!(status.edge_distance_percent, Some(100.0 * 1000.0 / 2000.0));
    }

    #[test]
    fn test_near_upper_edge() {
        let status = classify(-1000, 1000, 950);
        assert!(status.in_range);
        assert_eq!(status.edge_distance_percent, Some(2.5));
    }

    #[test]
    fn test_lower_bound_inclusive() {
        let status = classify(-1000, 1000, -1000);
        assert!(status.in_range);
        assert_eq!(status.edge_distance_percent, Some(0.0));
    }

    #[test]
    fn test_upper_bound_exclusive() {
        let status = classify(-1000, 1000, 1000);
        assert!(!status.in_range);
        assert_eq!(status.edge_distance_percent, None);
    }

    #[test]
    fn test_out_of_range_has_no_edge_distance() {
        assert_eq!(classify(-1000, 1000, -1500).edge_distance_percent, None);
        assert_eq!(classify(-1000, 1000, 2500).edge_distance_percent, None);
    }

    #[test]
    fn test_classification_exhaustive() {
        // Exactly one of {below, in range, at/above upper} for any tick.
        for tick in -2000..2000 {
            let below = tick < -1000;
            let at_or_above = tick >= 1000;
            let status = classify(-1000, 1000, tick);
            assert_eq!(status.in_range, !below && !at_or_above);
            assert_eq!(u32::from(below) + u32::from(status.in_range) + u32::from(at_or_above), 1);
        }
    }
}
