//! Rule-based validation of merged predictions.
//!
//! Final safety net, applied after the analytical fallbacks: by the time
//! a prediction reaches this point most fields should already be
//! populated, and these rules re-check them independently. Violations are
//! collected, not raised; the caller always gets a structured result.

use serde::Serialize;
use tracing::warn;

use crate::parser::Prediction;
use crate::routes::{DEFAULT_ROUTE, ROUTES, labels};

/// Hard delay bounds in seconds.
pub const MIN_DELAY: u32 = 10;
pub const MAX_DELAY: u32 = 3600;

/// Substitute text when the model produced no usable explanation.
const GENERIC_EXPLANATION: &str = "AI could not generate a clear explanation.";

/// Terminal artifact: the (possibly corrected) prediction, an overall
/// validity flag, and the ordered list of violations found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub prediction: Prediction,
}

/// Applies the hard safety rules to a merged prediction.
///
/// Rules run in order and all violations are collected, except the final
/// transport-failure check: raw model text beginning with `ERROR:` makes
/// the result unconditionally invalid.
pub fn validate_prediction(prediction: &Prediction) -> ValidationResult {
    let mut errors = Vec::new();
    let mut corrected = prediction.clone();

    // Rule 1: recommended route must name a catalog route; normalize to
    // the canonical identifier on match.
    let route = prediction.recommended_route.to_lowercase();
    let matched = ROUTES.iter().find(|r| route.contains(&r.id.to_lowercase()));
    match matched {
        Some(r) => corrected.recommended_route = r.id.to_string(),
        None => {
            errors.push(format!(
                "Invalid route '{}'. Must be one of {:?}",
                prediction.recommended_route,
                labels()
            ));
            corrected.recommended_route = DEFAULT_ROUTE.to_string();
        }
    }

    // Rule 2: expected delay must lie within the hard bounds; clamp to
    // the nearest bound otherwise.
    if prediction.expected_delay < MIN_DELAY {
        errors.push(format!(
            "Delay {}s is too low (min {}s)",
            prediction.expected_delay, MIN_DELAY
        ));
        corrected.expected_delay = MIN_DELAY;
    } else if prediction.expected_delay > MAX_DELAY {
        errors.push(format!(
            "Delay {}s exceeds maximum (max {}s)",
            prediction.expected_delay, MAX_DELAY
        ));
        corrected.expected_delay = MAX_DELAY;
    }

    // Rule 3: prediction text must not be blank. Recorded only; the
    // caller decides what to do with it.
    if prediction.prediction.trim().is_empty() {
        errors.push("Empty prediction generated".to_string());
    }

    // Rule 4: an explanation must exist.
    if prediction.explanation.trim().is_empty() {
        errors.push("No explanation provided".to_string());
        corrected.explanation = GENERIC_EXPLANATION.to_string();
    }

    // Rule 5: a transport failure marker in the raw text invalidates the
    // whole result, whatever the corrected fields look like.
    if prediction.raw_response.starts_with("ERROR:") {
        errors.push(prediction.raw_response.clone());
        warn!(error = %prediction.raw_response, "Model transport failure");
        return ValidationResult {
            is_valid: false,
            errors,
            prediction: corrected,
        };
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        prediction: corrected,
    }
}
