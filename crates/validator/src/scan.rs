use serde_json::Value;

use crate::error::ValidationError;

const SCRIPT_MARKERS: &[&str] = &["<script", "javascript:"];

/// Recursively reject `<script`, `javascript:`, and `on*`-named object keys
/// (the common XSS-sink attribute pattern, e.g. `onerror`/`onclick`)
/// anywhere in the payload (spec.md §4.6).
pub fn scan_for_script_injection(value: &Value) -> Result<(), ValidationError> {
    walk(value, "$")
}

fn walk(value: &Value, path: &str) -> Result<(), ValidationError> {
    match value {
        Value::String(s) => check_string(s, path),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, v) in map {
                if is_event_handler_attribute(key) {
                    return Err(ValidationError::ScriptInjection {
                        path: format!("{path}.{key}"),
                    });
                }
                walk(v, &format!("{path}.{key}"))?;
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

fn check_string(s: &str, path: &str) -> Result<(), ValidationError> {
    let lower = s.to_lowercase();
    if SCRIPT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Err(ValidationError::ScriptInjection { path: path.to_owned() });
    }
    Ok(())
}

/// True for keys like `onclick`/`onerror`/`onload` — `on` followed
/// immediately by at least one more ASCII letter, case-insensitive.
fn is_event_handler_attribute(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.len() > 2
        && lower.starts_with("on")
        && lower[2..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_benign_strings() {
        scan_for_script_injection(&json!({"body": "hello world"})).unwrap();
    }

    #[test]
    fn rejects_script_tag() {
        let value = json!({"body": "<script>alert(1)</script>"});
        let err = scan_for_script_injection(&value).unwrap_err();
        assert!(matches!(err, ValidationError::ScriptInjection { .. }));
    }

    #[test]
    fn rejects_javascript_uri() {
        let value = json!({"href": "javascript:alert(1)"});
        scan_for_script_injection(&value).unwrap_err();
    }

    #[test]
    fn rejects_event_handler_key() {
        let value = json!({"onclick": "doEvil()"});
        let err = scan_for_script_injection(&value).unwrap_err();
        match err {
            ValidationError::ScriptInjection { path } => assert_eq!(path, "$.onclick"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn does_not_false_positive_on_plain_keys() {
        scan_for_script_injection(&json!({"one": 1, "online": true, "on": "x"})).unwrap();
    }

    #[test]
    fn case_insensitive_match() {
        scan_for_script_injection(&json!({"x": "<SCRIPT>evil()"})).unwrap_err();
    }
}
