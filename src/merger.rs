//! Analytical fallback merging.
//!
//! Repairs weak fields in the parsed model output from analytically
//! computed ground truth, without discarding usable model text. The best
//! route is computed once up front and used uniformly; route and delay
//! are corrected before the text fields so the synthesized sentences can
//! reference the corrected choice.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::parser::Prediction;
use crate::routes::{DEFAULT_ROUTE, ROUTES};
use crate::selector::{Objective, estimate_delay, pick_best_route};
use crate::stats::RouteStats;

/// Delay values below this are treated as implausible/missing rather than
/// as genuinely tiny delays.
const MIN_PLAUSIBLE_DELAY: u32 = 10;

/// Text fields shorter than this are considered degenerate model output.
const MIN_TEXT_LEN: usize = 10;

/// Merged prediction plus the per-route stats it was reconciled against,
/// attached for downstream consumers regardless of whether any fallback
/// fired.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionReport {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub route_stats: HashMap<String, RouteStats>,
}

/// Back-fills missing, malformed, or implausible fields of a parsed
/// [`Prediction`] from analytical route data.
pub fn apply_fallbacks(
    mut parsed: Prediction,
    stats: &HashMap<String, RouteStats>,
    active_vehicles: u32,
    objective: Objective,
) -> PredictionReport {
    let best_route = pick_best_route(stats, objective);
    let best = stats.get(best_route).cloned().unwrap_or_default();

    if parsed.recommended_route.is_empty()
        || !parsed.recommended_route.to_lowercase().contains("route")
    {
        debug!(fallback = "recommended_route", best_route, "Applying analytical fallback");
        parsed.recommended_route = best_route.to_string();
    }

    if parsed.expected_delay < MIN_PLAUSIBLE_DELAY {
        parsed.expected_delay = estimate_delay(stats, best_route);
    }

    if parsed.prediction.chars().count() < MIN_TEXT_LEN {
        parsed.prediction = format!(
            "Network has {} active vehicles. {} has best conditions with {}m/s avg speed.",
            active_vehicles, best_route, best.avg_speed
        );
    }

    if parsed.congestion.is_empty() {
        let (worst_route, worst_vehicles) = most_congested(stats);
        parsed.congestion = format!(
            "{} is most congested with {} vehicles",
            worst_route, worst_vehicles
        );
    }

    if parsed.explanation.chars().count() < MIN_TEXT_LEN {
        parsed.explanation = format!(
            "{} recommended - avg speed {}m/s, {} vehicles on route.",
            best_route, best.avg_speed, best.vehicles
        );
    }

    PredictionReport {
        prediction: parsed,
        route_stats: stats.clone(),
    }
}

/// Route carrying the most vehicles, first catalog winner on ties.
fn most_congested(stats: &HashMap<String, RouteStats>) -> (&'static str, u32) {
    let mut worst: Option<(&'static str, u32)> = None;

    for route in ROUTES {
        let Some(s) = stats.get(route.id) else {
            continue;
        };
        if worst.is_none_or(|(_, n)| s.vehicles > n) {
            worst = Some((route.id, s.vehicles));
        }
    }

    worst.unwrap_or((DEFAULT_ROUTE, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_response;
    use crate::snapshot::EdgeSnapshot;
    use crate::stats::route_stats;

    fn edge(id: &str, vehicles: u32, speed: f64, wait: f64) -> EdgeSnapshot {
        EdgeSnapshot {
            id: id.to_string(),
            vehicle_count: vehicles,
            mean_speed: speed,
            occupancy: 0.0,
            waiting_time: wait,
        }
    }

    /// Route A fast and clear, Route B loaded, Route C slow.
    fn sample_stats() -> HashMap<String, RouteStats> {
        route_stats(&[
            edge("S1_J1", 1, 13.0, 0.0),
            edge("J1_J2", 1, 13.5, 0.0),
            edge("J2_J3", 0, 14.0, 0.0),
            edge("J3_D1", 0, 13.0, 0.0),
            edge("J1_J4", 9, 4.0, 55.0),
            edge("J4_J5", 7, 3.0, 40.0),
            edge("J4_J7", 2, 2.0, 10.0),
        ])
    }

    fn complete_prediction() -> Prediction {
        Prediction {
            prediction: "Traffic stays light across the network.".to_string(),
            congestion: "J1_J4 will congest first.".to_string(),
            recommended_route: "Route A".to_string(),
            expected_delay: 55,
            explanation: "Route A is fastest with no waiting.".to_string(),
            raw_response: "...".to_string(),
        }
    }

    #[test]
    fn test_complete_prediction_passes_through() {
        let stats = sample_stats();
        let report = apply_fallbacks(complete_prediction(), &stats, 20, Objective::Fast);
        assert_eq!(report.prediction, complete_prediction());
    }

    #[test]
    fn test_merger_is_idempotent() {
        let stats = sample_stats();
        let once = apply_fallbacks(parse_response(""), &stats, 20, Objective::Fast);
        let twice = apply_fallbacks(once.prediction.clone(), &stats, 20, Objective::Fast);
        assert_eq!(once.prediction, twice.prediction);
    }

    #[test]
    fn test_route_without_route_token_is_replaced() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.recommended_route = "take the highway".to_string();
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        assert_eq!(report.prediction.recommended_route, "Route A");
    }

    #[test]
    fn test_route_like_token_is_kept_verbatim() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.recommended_route = "Route B (City Road)".to_string();
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        // Normalization is the validator's job, not the merger's.
        assert_eq!(report.prediction.recommended_route, "Route B (City Road)");
    }

    #[test]
    fn test_implausible_delay_uses_best_route_estimate() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.recommended_route = "Route B (City Road)".to_string();
        parsed.expected_delay = 3;
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        // The estimate is always for the analytical best route (Route A).
        assert_eq!(
            report.prediction.expected_delay,
            estimate_delay(&stats, "Route A")
        );
    }

    #[test]
    fn test_plausible_delay_is_kept() {
        let stats = sample_stats();
        let report = apply_fallbacks(complete_prediction(), &stats, 20, Objective::Fast);
        assert_eq!(report.prediction.expected_delay, 55);
    }

    #[test]
    fn test_short_prediction_text_is_synthesized() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.prediction = "ok".to_string();
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        assert!(report.prediction.prediction.contains("20 active vehicles"));
        assert!(report.prediction.prediction.contains("Route A"));
    }

    #[test]
    fn test_empty_congestion_names_most_congested_route() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.congestion = String::new();
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        // Route B carries S1_J1 + J1_J4 + J4_J5 vehicles.
        assert!(report.prediction.congestion.starts_with("Route B is most congested with"));
    }

    #[test]
    fn test_short_explanation_is_synthesized() {
        let stats = sample_stats();
        let mut parsed = complete_prediction();
        parsed.explanation = "fast".to_string();
        let report = apply_fallbacks(parsed, &stats, 20, Objective::Fast);
        assert!(report.prediction.explanation.contains("Route A recommended"));
    }

    #[test]
    fn test_transport_error_fills_everything_analytically() {
        let stats = sample_stats();
        let raw = "ERROR: Cannot connect to Ollama. Make sure it is running (ollama serve).";
        let report = apply_fallbacks(parse_response(raw), &stats, 12, Objective::Fast);
        let p = &report.prediction;
        assert_eq!(p.recommended_route, "Route A");
        assert!(p.expected_delay >= 10);
        assert!(!p.prediction.is_empty());
        assert!(!p.congestion.is_empty());
        assert!(!p.explanation.is_empty());
        assert_eq!(p.raw_response, raw);
    }

    #[test]
    fn test_stats_are_always_attached() {
        let stats = sample_stats();
        let report = apply_fallbacks(complete_prediction(), &stats, 20, Objective::Fast);
        assert_eq!(report.route_stats, stats);
    }

    #[test]
    fn test_most_congested_tie_goes_to_first_catalog_route() {
        // Only the shared entry edge is instrumented: all routes tie.
        let stats = route_stats(&[edge("S1_J1", 5, 10.0, 0.0)]);
        assert_eq!(most_congested(&stats), ("Route A", 5));
    }
}
