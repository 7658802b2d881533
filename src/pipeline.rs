//! Request-scoped prediction pipeline.
//!
//! One invocation runs end-to-end for one caller: aggregate the snapshot,
//! render the prompt, query the text-generation collaborator, parse its
//! response, merge in analytical fallbacks, and validate. Everything is
//! allocated fresh per call; nothing is shared between invocations.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::generate::TextGenerator;
use crate::merger::apply_fallbacks;
use crate::parser::{Prediction, parse_response};
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::selector::Objective;
use crate::snapshot::StepSnapshot;
use crate::stats::{RouteStats, route_stats};
use crate::validator::validate_prediction;

/// Terminal pipeline artifact handed back to the caller: the corrected
/// prediction, the validity verdict with its reasons, and the per-route
/// stats the answer was reconciled against.
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub prediction: Prediction,
    pub route_stats: HashMap<String, RouteStats>,
}

/// Runs the full prediction pipeline against one snapshot.
///
/// The only blocking external call is the text generation; a transport
/// failure there degrades to an analytically-populated answer flagged
/// invalid, never to an error.
#[tracing::instrument(skip(generator, step), fields(vehicle_type, objective = %objective))]
pub async fn run_pipeline(
    generator: &dyn TextGenerator,
    step: &StepSnapshot,
    vehicle_type: &str,
    objective: Objective,
) -> Advisory {
    let stats = route_stats(&step.edges);
    let prompt = build_prompt(&stats, step.stats.active_vehicles, vehicle_type, objective);

    let raw = generator.generate(Some(SYSTEM_PROMPT), &prompt).await;
    debug!(response_len = raw.len(), "Model response received");

    let parsed = parse_response(&raw);
    let report = apply_fallbacks(parsed, &stats, step.stats.active_vehicles, objective);
    let validation = validate_prediction(&report.prediction);

    info!(
        is_valid = validation.is_valid,
        violations = validation.errors.len(),
        recommended_route = %validation.prediction.recommended_route,
        expected_delay = validation.prediction.expected_delay,
        "Pipeline complete"
    );

    Advisory {
        is_valid: validation.is_valid,
        errors: validation.errors,
        prediction: validation.prediction,
        route_stats: report.route_stats,
    }
}
