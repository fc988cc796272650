use sha2::{Digest, Sha256};

use crate::action::Action;
use crate::types::{ActionFingerprint, IntentId};

/// Canonicalize a `serde_json::Value` by recursively sorting object keys, so
/// that two structurally-equal payloads with different key ordering produce
/// the same serialized form.
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in entries {
                out.insert(k.clone(), canonicalize(v));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

/// Compute the canonical fingerprint of an action under an intent, used for
/// loop/rate detection (spec.md §4.3 step 5, §9 "canonical form").
///
/// The canonical form is `tool|op|<sorted-key JSON params>|intent_id`, hashed
/// with SHA-256 and hex-encoded. This is deterministic across processes given
/// the same logical inputs, satisfying the reproducibility invariant in
/// spec.md §8.
#[must_use]
pub fn compute_fingerprint(action: &Action, intent_id: &IntentId) -> ActionFingerprint {
    let canonical_params = canonicalize(&action.params);
    let params_json =
        serde_json::to_string(&canonical_params).unwrap_or_else(|_| "null".to_owned());
    let preimage = format!("{}|{}|{}|{}", action.tool, action.op, params_json, intent_id);

    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    let digest = hasher.finalize();
    ActionFingerprint::new(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_under_key_reordering() {
        let intent_id = IntentId::new("intent-1");
        let a = Action::new("email", "send", serde_json::json!({"to": "a", "subject": "hi"}));
        let b = Action::new("email", "send", serde_json::json!({"subject": "hi", "to": "a"}));
        assert_eq!(
            compute_fingerprint(&a, &intent_id),
            compute_fingerprint(&b, &intent_id)
        );
    }

    #[test]
    fn fingerprint_differs_on_intent() {
        let action = Action::new("email", "send", serde_json::json!({"to": "a"}));
        let fp1 = compute_fingerprint(&action, &IntentId::new("intent-1"));
        let fp2 = compute_fingerprint(&action, &IntentId::new("intent-2"));
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn fingerprint_differs_on_params() {
        let intent_id = IntentId::new("intent-1");
        let a = Action::new("email", "send", serde_json::json!({"to": "a"}));
        let b = Action::new("email", "send", serde_json::json!({"to": "b"}));
        assert_ne!(
            compute_fingerprint(&a, &intent_id),
            compute_fingerprint(&b, &intent_id)
        );
    }

    #[test]
    fn fingerprint_is_hex_sha256_length() {
        let fp = compute_fingerprint(
            &Action::new("x", "y", serde_json::Value::Null),
            &IntentId::new("i"),
        );
        assert_eq!(fp.as_str().len(), 64);
    }
}
