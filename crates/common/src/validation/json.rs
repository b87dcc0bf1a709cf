// JSON payload sanitization
use serde_json::Value;

use super::html::encode_html;
use super::ValidationResult;

/// Default maximum container nesting depth
pub const DEFAULT_MAX_JSON_DEPTH: usize = 10;

pub(crate) fn sanitize_json(text: &str, max_depth: usize) -> ValidationResult<Value> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        // serde_json refuses pathological nesting before we can measure it
        Err(err) if err.to_string().contains("recursion limit") => {
            return ValidationResult::rejected(format!(
                "JSON nesting depth exceeds maximum of {}",
                max_depth
            ));
        }
        Err(_) => return ValidationResult::rejected("Invalid JSON format"),
    };

    let depth = nesting_depth(&value);
    if depth > max_depth {
        return ValidationResult::rejected(format!(
            "JSON nesting depth {} exceeds maximum of {}",
            depth, max_depth
        ));
    }

    ValidationResult::from_parts(Some(encode_strings(value)), Vec::new(), Vec::new())
}

/// Depth of container nesting; a scalar is 0, `[]` and `{}` are 1.
pub(crate) fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn encode_strings(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(encode_html(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(encode_strings).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, encode_strings(v))).collect())
        }
        other => other,
    }
}
