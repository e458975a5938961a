//! Response Sanitizer: turns untrusted model output into a [`Review`].
//!
//! Recovery is a two-step policy, not a JSON repair tool:
//! 1. parse the whole string;
//! 2. otherwise parse the span from the first `{` to the last `}`.
//!
//! Only a total failure to find a JSON object is an error. Once an object is in
//! hand every field is coerced independently and malformed fields degrade to
//! defaults (empty list, score 0) instead of failing the response.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::review::models::Review;

/// Upper bound on entries kept for each list field.
pub const MAX_ITEMS: usize = 10;

#[derive(Debug, Error)]
#[error("model response did not contain a JSON object")]
pub struct ParseFailure;

/// Parses and coerces a raw model response.
pub fn sanitize(raw: &str) -> Result<Review, ParseFailure> {
    let object = parse_object(raw).ok_or(ParseFailure)?;
    Ok(coerce_review(&object))
}

/// Locates a JSON object in `raw` using the two-step fallback.
fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) {
        return Some(object);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Coerces each field of a parsed object into the review schema. Never fails.
pub fn coerce_review(object: &Map<String, Value>) -> Review {
    Review {
        strengths: coerce_list(object.get("strengths")),
        weaknesses: coerce_list(object.get("weaknesses")),
        suggestions: coerce_list(object.get("suggestions")),
        score: coerce_score(object.get("score")),
    }
}

fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(item_text).take(MAX_ITEMS).collect(),
        _ => Vec::new(),
    }
}

/// String form of a list element, or `None` for falsy values (null, false, 0, "").
fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(item.to_string()),
    }
}

fn coerce_score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => n
            .round()
            .clamp(f64::from(Review::MIN_SCORE), f64::from(Review::MAX_SCORE))
            as u8,
        _ => Review::INVALID_SCORE,
    }
}
