//! Per-route telemetry aggregation.
//!
//! Reduces raw per-edge snapshot rows into one [`RouteStats`] record per
//! catalog route. Stats are recomputed fresh for every request and never
//! mutated after computation.

use serde::Serialize;
use std::collections::HashMap;

use crate::routes::ROUTES;
use crate::snapshot::EdgeSnapshot;

/// Aggregated telemetry for one advisory route.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RouteStats {
    /// Mean speed across the route's edges that reported a strictly
    /// positive speed; 0 when none qualified.
    pub avg_speed: f64,
    pub vehicles: u32,
    pub waiting_time: f64,
    /// Length of the route definition, not the matched-edge count.
    pub edge_count: usize,
}

/// Computes [`RouteStats`] for every catalog route from one snapshot.
///
/// Edges absent from the snapshot are skipped; stalled edges (speed 0)
/// still contribute vehicles and waiting time but are excluded from the
/// speed average so they cannot drag it to zero spuriously.
pub fn route_stats(edges: &[EdgeSnapshot]) -> HashMap<String, RouteStats> {
    let lookup: HashMap<&str, &EdgeSnapshot> =
        edges.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut stats = HashMap::new();

    for route in ROUTES {
        let mut speeds = Vec::new();
        let mut total_vehicles = 0u32;
        let mut total_wait = 0.0f64;

        for edge_id in route.edges {
            if let Some(edge) = lookup.get(edge_id) {
                if edge.mean_speed > 0.0 {
                    speeds.push(edge.mean_speed);
                }
                total_vehicles += edge.vehicle_count;
                total_wait += edge.waiting_time;
            }
        }

        let avg_speed = if speeds.is_empty() {
            0.0
        } else {
            let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        stats.insert(
            route.id.to_string(),
            RouteStats {
                avg_speed,
                vehicles: total_vehicles,
                waiting_time: (total_wait * 10.0).round() / 10.0,
                edge_count: route.edges.len(),
            },
        );
    }

    stats
}
