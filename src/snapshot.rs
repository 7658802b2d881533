//! Simulator snapshot input contract.
//!
//! The simulator collaborator emits one snapshot per step; the prediction
//! pipeline consumes the latest one. All records here are plain immutable
//! inputs, deserialized from the collaborator's JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Telemetry for one road segment at one simulated instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: String,
    pub vehicle_count: u32,
    pub mean_speed: f64,
    #[serde(default)]
    pub occupancy: f64,
    pub waiting_time: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Per-vehicle telemetry carried in a step snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: String,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub road: String,
    #[serde(default)]
    pub lane_position: f64,
    #[serde(default)]
    pub route: Vec<String>,
    #[serde(default, rename = "type")]
    pub vehicle_type: String,
    #[serde(default)]
    pub co2_emission: f64,
}

/// Network-wide vehicle totals at one instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkTotals {
    pub active_vehicles: u32,
    #[serde(default)]
    pub departed: u32,
    #[serde(default)]
    pub arrived: u32,
}

/// Everything the simulator reports for one step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepSnapshot {
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub vehicles: Vec<VehicleSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub stats: NetworkTotals,
}

/// Whole-run totals folded from a step sequence.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub total_steps: usize,
    pub total_vehicles: usize,
    pub total_co2_mg: f64,
}

/// Folds a step sequence into run totals: step count, distinct vehicles
/// seen, and accumulated CO2.
pub fn summarize(steps: &[StepSnapshot]) -> RunSummary {
    let mut seen = std::collections::HashSet::new();
    let mut total_co2 = 0.0;

    for step in steps {
        for vehicle in &step.vehicles {
            seen.insert(vehicle.id.as_str());
            total_co2 += vehicle.co2_emission;
        }
    }

    RunSummary {
        total_steps: steps.len(),
        total_vehicles: seen.len(),
        total_co2_mg: (total_co2 * 100.0).round() / 100.0,
    }
}

/// Loads step snapshots from a JSON file.
///
/// Accepts either a single step object or an array of steps, since the
/// simulator collaborator may hand over one instant or a whole run.
pub fn load_steps(path: &str) -> Result<Vec<StepSnapshot>> {
    let content = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read snapshot file {}", path))?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("snapshot file {} is not valid JSON", path))?;

    let steps = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    Ok(steps)
}
