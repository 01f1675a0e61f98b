//! crates/prompt2learn_core/src/recovery.rs
//!
//! Recovers a JSON value from the raw text returned by the generation model.
//!
//! Two strategies are tried, in order:
//! 1. strip a surrounding markdown code fence and parse what is left;
//! 2. parse the single span from the first `{` to the last `}` of the raw text.
//!
//! No other repair is attempted.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::PlanError;

/// An opening fence line such as "```" or "```json".
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*(\r?\n|$)").expect("valid fence regex"));

/// A closing fence, optionally preceded by a line break.
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\r?\n)?```$").expect("valid fence regex"));

/// Parses the model's raw output into an untyped JSON value.
pub fn recover_plan_value(raw: &str) -> Result<Value, PlanError> {
    if raw.trim().is_empty() {
        return Err(PlanError::MalformedModelOutput(
            "model returned an empty response".to_string(),
        ));
    }

    let unfenced = strip_code_fence(raw);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Ok(value);
    }

    match outermost_brace_span(raw) {
        Some(span) => serde_json::from_str::<Value>(span).map_err(|e| {
            PlanError::MalformedModelOutput(format!("embedded JSON object is invalid: {e}"))
        }),
        None => Err(PlanError::MalformedModelOutput(
            "model did not return valid JSON".to_string(),
        )),
    }
}

/// Removes a leading fence line and a trailing fence, then trims whitespace.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = match OPENING_FENCE.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    };
    let without_close = match CLOSING_FENCE.find(without_open) {
        Some(m) => &without_open[..m.start()],
        None => without_open,
    };
    without_close.trim()
}

/// The text between the first `{` and the last `}`, inclusive.
fn outermost_brace_span(raw: &str) -> Option<&str> {
    let first = raw.find('{')?;
    let last = raw.rfind('}')?;
    (last > first).then(|| &raw[first..=last])
}
