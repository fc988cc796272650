use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CredentialId, TenantId};

/// Discriminator for the shape of [`Credential::payload_blob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    /// `{base_url, auth_mode, secret}` downstream proxy credential.
    BotGateway,
    /// SMTP or provider-API email credential.
    Email,
    /// Generic API key/token credential for a named tool.
    ApiKey,
}

/// A stored, write-only-over-HTTP credential owned by the Vault
/// (spec.md §3, Credential entity).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Credential {
    pub credential_id: CredentialId,
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub credential_type: CredentialType,
    /// Ciphertext (if `encrypted_flag`) or plaintext JSON payload. Never
    /// serialized back out over any HTTP response; see `edon-vault`.
    #[serde(skip_serializing)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payload_blob: serde_json::Value,
    pub encrypted_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// The decrypted, in-memory view handed to a Connector at execution time.
/// Never crosses a request boundary or an HTTP response (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct CredentialHandle {
    pub credential_id: CredentialId,
    pub tool_name: String,
    pub credential_type: CredentialType,
    pub payload: serde_json::Value,
}

/// Read-only integration status surfaced to operators
/// (spec.md §4.1 `get_integration_status`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IntegrationStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ok_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_payload_not_serialized() {
        let cred = Credential {
            credential_id: CredentialId::from("cred-1"),
            tool_name: "clawdbot".into(),
            tenant_id: None,
            credential_type: CredentialType::BotGateway,
            payload_blob: serde_json::json!({"secret": "shh"}),
            encrypted_flag: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_used_at: None,
            last_error: None,
        };
        let json = serde_json::to_string(&cred).unwrap();
        assert!(!json.contains("shh"));
        assert!(!json.contains("payload_blob"));
    }
}
