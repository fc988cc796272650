pub mod error;
pub mod limits;
pub mod scan;
pub mod structure;

pub use error::ValidationError;
pub use limits::Limits;

use serde_json::Value;

/// Run every reject-only check spec.md §4.6 names, in the order they're
/// cheapest to fail: body size first (no JSON parse needed), then structural
/// depth/string/array bounds, then the script-injection scan. The first
/// violation short-circuits the rest — callers surface it as an HTTP 400
/// (413 for body size) carrying the offending JSONPath.
pub fn validate_request(body_len: usize, value: &Value, limits: Limits) -> Result<(), ValidationError> {
    if body_len > limits.max_body_bytes {
        return Err(ValidationError::BodyTooLarge {
            max_bytes: limits.max_body_bytes,
        });
    }
    structure::validate_structure(value, limits)?;
    scan::scan_for_script_injection(value)?;
    Ok(())
}

/// Validate `action.params` alone against the narrower 5 MiB cap spec.md
/// §4.6 applies to that field specifically, independent of the whole-body cap.
pub fn validate_params_size(params: &Value, limits: Limits) -> Result<(), ValidationError> {
    let serialized = serde_json::to_vec(params).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    if serialized.len() > limits.max_params_bytes {
        return Err(ValidationError::ParamsTooLarge {
            max_bytes: limits.max_params_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_request() {
        let value = json!({"tool": "email", "op": "send", "params": {"to": "a@x.com"}});
        validate_request(value.to_string().len(), &value, Limits::default()).unwrap();
    }

    #[test]
    fn rejects_oversized_body() {
        let value = json!({});
        let err = validate_request(11 * 1024 * 1024, &value, Limits::default()).unwrap_err();
        assert!(matches!(err, ValidationError::BodyTooLarge { .. }));
    }

    #[test]
    fn rejects_oversized_params() {
        let params = json!({"blob": "x".repeat(6 * 1024 * 1024)});
        let err = validate_params_size(&params, Limits::default()).unwrap_err();
        assert!(matches!(err, ValidationError::ParamsTooLarge { .. }));
    }
}
