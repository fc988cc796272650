use axum::extract::{Extension, Path, State};
use axum::Json;

use edon_policypacks::Pack;

use crate::api::schemas::{ApplyPackResponse, PolicyPackSummary};
use crate::auth::Identity;
use crate::error::ServerError;
use crate::state::AppState;

const ALL_PACKS: [Pack; 4] = [Pack::PersonalSafe, Pack::WorkSafe, Pack::OpsAdmin, Pack::ClawdbotSafe];

/// `GET /policy-packs` — the four named presets (spec.md §4.10).
#[utoipa::path(get, path = "/policy-packs", responses((status = 200, body = [PolicyPackSummary])))]
pub async fn list_packs() -> Json<Vec<PolicyPackSummary>> {
    Json(ALL_PACKS.iter().map(|pack| PolicyPackSummary { name: pack.name().to_owned() }).collect())
}

/// `POST /policy-packs/{name}/apply` — compile and apply a named pack as the
/// caller's tenant default intent.
#[utoipa::path(post, path = "/policy-packs/{name}/apply", responses((status = 200, body = ApplyPackResponse)))]
pub async fn apply_pack(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(name): Path<String>,
) -> Result<Json<ApplyPackResponse>, ServerError> {
    let intent_id = edon_policypacks::apply_named(&state.store, &identity.tenant_id, &name).await?;
    Ok(Json(ApplyPackResponse { intent_id: intent_id.to_string() }))
}
