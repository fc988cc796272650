use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use edon_core::CredentialId;

use crate::api::schemas::SetCredentialRequest;
use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

/// `POST /credentials/set` — write-only credential upsert (spec.md §4.2).
/// Never returns the stored payload; only the id is ever echoed back.
#[utoipa::path(post, path = "/credentials/set", request_body = SetCredentialRequest, responses((status = 200, description = "credential stored")))]
pub async fn set_credential(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<axum::Json<serde_json::Value>, ServerError> {
    let req: SetCredentialRequest = crate::api::read_validated_json(body).await?;
    let credential_id = state
        .vault
        .set(
            CredentialId::from(req.credential_id),
            req.tool_name,
            Some(identity.tenant_id.clone()),
            req.credential_type,
            req.payload,
            req.encrypt,
        )
        .await?;
    Ok(axum::Json(serde_json::json!({"credential_id": credential_id.to_string()})))
}

/// `DELETE /credentials/{id}` — revoke a stored credential.
#[utoipa::path(delete, path = "/credentials/{id}", responses((status = 204, description = "credential deleted")))]
pub async fn delete_credential(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.vault.delete(&CredentialId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
