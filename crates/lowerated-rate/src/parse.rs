//! Parsing completion text into per-attribute scores.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::RateError;
use crate::types::ScoreMap;

/// Parse `text` as a JSON object and keep the values of requested attributes.
///
/// Keys outside `attributes` are ignored whatever their type. Requested
/// attributes missing from the object are simply absent from the result.
/// Values are not clamped.
///
/// # Errors
///
/// Returns [`RateError::Format`] if `text` is not valid JSON, is not an
/// object, or maps a requested attribute to something other than a number.
pub(crate) fn parse_scores(text: &str, attributes: &BTreeSet<&str>) -> Result<ScoreMap, RateError> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|e| RateError::Format {
        reason: format!("response is not valid JSON: {e}"),
    })?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(RateError::Format {
                reason: format!("expected a JSON object, got {}", json_type_name(&other)),
            });
        }
    };

    let mut scores = ScoreMap::new();
    for (key, raw) in object {
        if !attributes.contains(key.as_str()) {
            continue;
        }
        let score = raw.as_f64().ok_or_else(|| RateError::Format {
            reason: format!(
                "attribute '{key}' has a non-numeric value ({})",
                json_type_name(&raw)
            ),
        })?;
        scores.insert(key, score);
    }

    Ok(scores)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
