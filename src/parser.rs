//! Tolerant parser for the model's free-text response.
//!
//! The response is untrusted: labels may be missing, reordered, cased
//! differently, or spaced with underscores. Each field has its own total
//! extractor, so absence of structure degrades to empty fields instead of
//! an error. The parser never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PREDICTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PREDICTION\s*:\s*(.+)").expect("prediction regex"));
static CONGESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CONGESTION\s*:\s*(.+)").expect("congestion regex"));
static ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)RECOMMENDED[_\s]ROUTE\s*:\s*(.+)").expect("route regex"));
static DELAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EXPECTED[_\s]DELAY\s*:\s*(.+)").expect("delay regex"));
static EXPLANATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EXPLANATION\s*:\s*(.+)").expect("explanation regex"));

/// Leading numeric token, integer or decimal ("25" in "25.0s or so").
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("number regex"));

/// Working prediction record for one pipeline invocation.
///
/// Created by the parser, back-filled field by field by the merger, then
/// clamped and normalized by the validator. The raw model text is kept
/// verbatim for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub prediction: String,
    pub congestion: String,
    pub recommended_route: String,
    /// Expected delay in seconds.
    pub expected_delay: u32,
    pub explanation: String,
    pub raw_response: String,
}

fn extract(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the first numeric token after the delay label, truncated to
/// whole seconds. No numeric token yields 0.
fn extract_delay(text: &str) -> u32 {
    let value = extract(&DELAY_RE, text);
    NUMBER_RE
        .captures(&value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(0, |n| n as u32)
}

/// Parses arbitrary model text into a [`Prediction`].
///
/// Missing labels yield empty strings (0 for the delay); the original
/// text is always retained in `raw_response`.
pub fn parse_response(raw: &str) -> Prediction {
    Prediction {
        prediction: extract(&PREDICTION_RE, raw),
        congestion: extract(&CONGESTION_RE, raw),
        recommended_route: extract(&ROUTE_RE, raw),
        expected_delay: extract_delay(raw),
        explanation: extract(&EXPLANATION_RE, raw),
        raw_response: raw.to_string(),
    }
}
