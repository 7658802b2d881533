//! Prompt rendering for the text-generation collaborator.
//!
//! Pure functions: aggregated stats plus caller intent in, bounded prompt
//! text out. No side effects, no network access.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::routes::ROUTES;
use crate::selector::Objective;
use crate::stats::RouteStats;

/// System instruction pinning the five-line response format the parser
/// expects.
pub const SYSTEM_PROMPT: &str = "You are a traffic prediction AI. You receive traffic data and reply in EXACTLY this format:

PREDICTION: <traffic forecast>
CONGESTION: <which roads will congest>
RECOMMENDED_ROUTE: <Route A or Route B or Route C>
EXPECTED_DELAY: <number in seconds>
EXPLANATION: <one sentence reason>

Only output these 5 lines. Nothing else.";

/// Renders current per-route conditions and the caller's intent into a
/// concise prompt.
pub fn build_prompt(
    stats: &HashMap<String, RouteStats>,
    active_vehicles: u32,
    vehicle_type: &str,
    objective: Objective,
) -> String {
    let mut route_info = String::new();
    for route in ROUTES {
        let rs = stats.get(route.id).cloned().unwrap_or_default();
        let _ = writeln!(
            route_info,
            "- {} ({}): speed={}m/s, vehicles={}, wait={}s",
            route.id, route.name, rs.avg_speed, rs.vehicles, rs.waiting_time
        );
    }

    format!(
        "Traffic: {} vehicles on network.\n\nRoute conditions:\n{}\n\nVehicle: {}, Goal: {}\n\nWhich route is best? Give prediction now.",
        active_vehicles,
        route_info.trim_end(),
        vehicle_type,
        objective
    )
}
