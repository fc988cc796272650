use chrono::Utc;
use edon_core::{Credential, CredentialHandle, CredentialId, CredentialType, TenantId};
use edon_store::{Store, StoreError};
use thiserror::Error;

use crate::crypto::{MasterKey, PayloadEncryptor};

/// Errors the Vault facade can raise. Distinct from [`StoreError`] so
/// callers can distinguish "no such credential" (`CredentialMissing`) from a
/// generic store failure.
#[derive(Debug, Error)]
pub enum VaultError {
    /// No credential matched the request and, because `CREDENTIALS_STRICT`
    /// is enabled, no fallback source may be consulted.
    #[error("credential missing for tool {0}")]
    CredentialMissing(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Crypto(#[from] crate::crypto::CryptoError),
}

/// Thin typed facade over the Store's credential rows (spec.md §4.2). Never
/// exposes `get(credential_id)` or payload enumeration over HTTP — only
/// `set`, `delete`, and `get_for_execution` (which returns an in-memory
/// handle the caller must not serialize back to a client).
pub struct Vault<S: Store> {
    store: S,
    encryptor: PayloadEncryptor,
    /// When true, `get_for_execution` fails closed on a missing row instead
    /// of consulting any fallback source (`CREDENTIALS_STRICT`, spec.md §4.11).
    strict: bool,
}

impl<S: Store> Vault<S> {
    #[must_use]
    pub fn new(store: S, master_key: MasterKey, strict: bool) -> Self {
        Self {
            store,
            encryptor: PayloadEncryptor::new(master_key),
            strict,
        }
    }

    /// Idempotent upsert of a credential. When `encrypt` is true, the
    /// payload is AES-256-GCM encrypted before it ever reaches the Store.
    pub async fn set(
        &self,
        credential_id: CredentialId,
        tool_name: String,
        tenant_id: Option<TenantId>,
        credential_type: CredentialType,
        payload: serde_json::Value,
        encrypt: bool,
    ) -> Result<CredentialId, VaultError> {
        let now = Utc::now();
        let payload_blob = if encrypt {
            serde_json::Value::String(self.encryptor.encrypt_json(&payload)?)
        } else {
            payload
        };

        let credential = Credential {
            credential_id,
            tool_name,
            tenant_id,
            credential_type,
            payload_blob,
            encrypted_flag: encrypt,
            created_at: now,
            updated_at: now,
            last_used_at: None,
            last_error: None,
        };

        Ok(self.store.save_credential(credential).await?)
    }

    pub async fn delete(&self, credential_id: &CredentialId) -> Result<(), VaultError> {
        Ok(self.store.delete_credential(credential_id).await?)
    }

    /// Fetch and decrypt the credential for `tool_name`, for Connector use
    /// only. Under `CREDENTIALS_STRICT`, a missing row is a hard
    /// [`VaultError::CredentialMissing`] — never silently falls back to an
    /// environment variable or config file.
    pub async fn get_for_execution(
        &self,
        tool_name: &str,
        tenant_id: Option<&TenantId>,
    ) -> Result<CredentialHandle, VaultError> {
        let credential = match self.store.get_credential_by_tool(tool_name, tenant_id).await {
            Ok(credential) => credential,
            Err(StoreError::NotFound(_)) => {
                return Err(VaultError::CredentialMissing(tool_name.to_owned()));
            }
            Err(other) => return Err(other.into()),
        };

        let payload = if credential.encrypted_flag {
            let envelope = credential
                .payload_blob
                .as_str()
                .ok_or_else(|| crate::crypto::CryptoError::InvalidFormat("payload is not a string".into()))?;
            self.encryptor.decrypt_json(envelope)?
        } else {
            credential.payload_blob
        };

        Ok(CredentialHandle {
            credential_id: credential.credential_id,
            tool_name: credential.tool_name,
            credential_type: credential.credential_type,
            payload,
        })
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edon_store::{SqliteStore, StoreConfig};

    fn test_key() -> MasterKey {
        crate::crypto::parse_master_key(&"42".repeat(32)).unwrap()
    }

    async fn test_vault(strict: bool) -> Vault<SqliteStore> {
        let store = SqliteStore::connect(&StoreConfig {
            database_path: ":memory:".into(),
            pool_size: 1,
        })
        .await
        .unwrap();
        Vault::new(store, test_key(), strict)
    }

    #[tokio::test]
    async fn set_then_get_for_execution_decrypts() {
        let vault = test_vault(false).await;
        vault
            .set(
                CredentialId::from("cred-1"),
                "email".into(),
                None,
                CredentialType::Email,
                serde_json::json!({"smtp_host": "mail.example.com"}),
                true,
            )
            .await
            .unwrap();

        let handle = vault.get_for_execution("email", None).await.unwrap();
        assert_eq!(handle.payload["smtp_host"], "mail.example.com");
    }

    #[tokio::test]
    async fn strict_mode_fails_closed_on_missing_credential() {
        let vault = test_vault(true).await;
        let result = vault.get_for_execution("nonexistent", None).await;
        assert!(matches!(result, Err(VaultError::CredentialMissing(_))));
    }

    #[tokio::test]
    async fn delete_removes_credential() {
        let vault = test_vault(false).await;
        vault
            .set(
                CredentialId::from("cred-2"),
                "clawdbot".into(),
                None,
                CredentialType::BotGateway,
                serde_json::json!({"secret": "s"}),
                false,
            )
            .await
            .unwrap();
        vault.delete(&CredentialId::from("cred-2")).await.unwrap();

        let result = vault.get_for_execution("clawdbot", None).await;
        assert!(matches!(result, Err(VaultError::CredentialMissing(_))));
    }

    #[tokio::test]
    async fn unencrypted_payload_passes_through() {
        let vault = test_vault(false).await;
        vault
            .set(
                CredentialId::from("cred-3"),
                "search".into(),
                None,
                CredentialType::ApiKey,
                serde_json::json!({"api_key": "plain-key"}),
                false,
            )
            .await
            .unwrap();

        let handle = vault.get_for_execution("search", None).await.unwrap();
        assert_eq!(handle.payload["api_key"], "plain-key");
    }
}
