use serde_json::Value;

use crate::error::ValidationError;
use crate::limits::Limits;

/// Walk `value` enforcing depth, per-string, and per-array bounds. Depth 1 is
/// the root value itself, matching how a JSONPath `$` reports zero extra
/// segments at the root.
pub fn validate_structure(value: &Value, limits: Limits) -> Result<(), ValidationError> {
    walk(value, limits, 1, "$")
}

fn walk(value: &Value, limits: Limits, depth: usize, path: &str) -> Result<(), ValidationError> {
    if depth > limits.max_depth {
        return Err(ValidationError::TooDeep { path: path.to_owned() });
    }

    match value {
        Value::String(s) => {
            if s.len() > limits.max_string_bytes {
                return Err(ValidationError::StringTooLarge { path: path.to_owned() });
            }
            Ok(())
        }
        Value::Array(items) => {
            if items.len() > limits.max_array_len {
                return Err(ValidationError::ArrayTooLarge { path: path.to_owned() });
            }
            for (i, item) in items.iter().enumerate() {
                walk(item, limits, depth + 1, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, v) in map {
                walk(v, limits, depth + 1, &format!("{path}.{key}"))?;
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}
