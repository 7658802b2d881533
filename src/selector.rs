//! Analytical route selection and delay estimation.
//!
//! This is the ground truth the merger falls back to when the model's
//! output is missing or implausible.

use std::collections::HashMap;
use std::fmt;

use crate::routes::{DEFAULT_ROUTE, ROUTES};
use crate::stats::RouteStats;

/// Caller-selected scoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Maximize speed, penalize route length.
    Fast,
    /// Minimize vehicle load and waiting time.
    Safe,
}

impl Objective {
    /// Anything other than "fast" selects the safe objective.
    pub fn from_param(s: &str) -> Self {
        if s == "fast" { Objective::Fast } else { Objective::Safe }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Fast => write!(f, "fast"),
            Objective::Safe => write!(f, "safe"),
        }
    }
}

/// Picks the best route by objective score, argmax over the catalog in
/// declaration order (first-seen wins ties). Falls back to the default
/// route when the stats mapping is empty.
pub fn pick_best_route(stats: &HashMap<String, RouteStats>, objective: Objective) -> &'static str {
    let mut best: Option<(&'static str, f64)> = None;

    for route in ROUTES {
        let Some(s) = stats.get(route.id) else {
            continue;
        };
        let score = match objective {
            // Higher speed + fewer edges = better.
            Objective::Fast => s.avg_speed - s.edge_count as f64 * 0.5,
            // Fewer vehicles + less waiting = safer; the sign flip keeps
            // a uniform argmax.
            Objective::Safe => -(f64::from(s.vehicles) + s.waiting_time),
        };

        if best.is_none_or(|(_, b)| score > b) {
            best = Some((route.id, score));
        }
    }

    best.map_or(DEFAULT_ROUTE, |(id, _)| id)
}

/// Estimates travel delay in seconds for a route from its stats.
///
/// delay = (edges * 150 m) / speed + waiting_time, with the speed floored
/// at 1 m/s. Deliberately crude: every edge is assumed 150 m long.
pub fn estimate_delay(stats: &HashMap<String, RouteStats>, route: &str) -> u32 {
    let (mut speed, edge_count, wait) = match stats.get(route) {
        Some(s) => (s.avg_speed, s.edge_count, s.waiting_time),
        None => (5.0, 4, 0.0),
    };
    if speed < 1.0 {
        speed = 1.0;
    }
    let distance = edge_count as f64 * 150.0;
    (distance / speed + wait).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_for(entries: &[(&str, f64, u32, f64, usize)]) -> HashMap<String, RouteStats> {
        entries
            .iter()
            .map(|(id, speed, vehicles, wait, edges)| {
                (
                    id.to_string(),
                    RouteStats {
                        avg_speed: *speed,
                        vehicles: *vehicles,
                        waiting_time: *wait,
                        edge_count: *edges,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_objective_from_param() {
        assert_eq!(Objective::from_param("fast"), Objective::Fast);
        assert_eq!(Objective::from_param("safe"), Objective::Safe);
        assert_eq!(Objective::from_param("anything"), Objective::Safe);
    }

    #[test]
    fn test_fast_prefers_speed_over_length() {
        let stats = stats_for(&[
            ("Route A", 10.0, 0, 0.0, 4),
            ("Route B", 13.5, 0, 0.0, 6),
            ("Route C", 9.0, 0, 0.0, 8),
        ]);
        // A: 10 - 2 = 8, B: 13.5 - 3 = 10.5, C: 9 - 4 = 5
        assert_eq!(pick_best_route(&stats, Objective::Fast), "Route B");
    }

    #[test]
    fn test_fast_edge_penalty_can_flip_the_winner() {
        let stats = stats_for(&[
            ("Route A", 10.0, 0, 0.0, 4),
            ("Route C", 11.0, 0, 0.0, 8),
        ]);
        // A: 10 - 2 = 8 beats C: 11 - 4 = 7 despite the lower speed.
        assert_eq!(pick_best_route(&stats, Objective::Fast), "Route A");
    }

    #[test]
    fn test_safe_prefers_low_load() {
        let stats = stats_for(&[
            ("Route A", 12.0, 20, 60.0, 4),
            ("Route B", 8.0, 3, 5.0, 6),
            ("Route C", 9.0, 10, 30.0, 8),
        ]);
        assert_eq!(pick_best_route(&stats, Objective::Safe), "Route B");
    }

    #[test]
    fn test_ties_go_to_first_catalog_route() {
        let stats = stats_for(&[
            ("Route A", 10.0, 5, 0.0, 4),
            ("Route B", 12.0, 5, 0.0, 8),
        ]);
        // Identical fast scores (8.0): Route A wins by catalog order.
        assert_eq!(pick_best_route(&stats, Objective::Fast), "Route A");
    }

    #[test]
    fn test_empty_stats_fall_back_to_default() {
        let stats = HashMap::new();
        assert_eq!(pick_best_route(&stats, Objective::Fast), "Route A");
        assert_eq!(pick_best_route(&stats, Objective::Safe), "Route A");
    }

    #[test]
    fn test_best_route_is_always_a_stats_key() {
        let stats = stats_for(&[("Route B", 5.0, 2, 1.0, 6)]);
        let best = pick_best_route(&stats, Objective::Fast);
        assert!(stats.contains_key(best));
    }

    #[test]
    fn test_estimate_delay_basic() {
        let stats = stats_for(&[("Route A", 10.0, 0, 20.0, 4)]);
        // 4 * 150 / 10 + 20 = 80
        assert_eq!(estimate_delay(&stats, "Route A"), 80);
    }

    #[test]
    fn test_estimate_delay_floors_speed_at_one() {
        let stats = stats_for(&[("Route A", 0.0, 0, 0.0, 4)]);
        assert_eq!(estimate_delay(&stats, "Route A"), 600);
    }

    #[test]
    fn test_estimate_delay_unknown_route_uses_defaults() {
        let stats = HashMap::new();
        // 4 * 150 / 5 + 0 = 120
        assert_eq!(estimate_delay(&stats, "Route X"), 120);
    }

    #[test]
    fn test_estimate_delay_monotone_in_waiting_time() {
        let mut last = 0;
        for wait in [0.0, 15.0, 90.0, 400.0] {
            let stats = stats_for(&[("Route B", 9.0, 0, wait, 6)]);
            let delay = estimate_delay(&stats, "Route B");
            assert!(delay >= last);
            last = delay;
        }
    }
}
