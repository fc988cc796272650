use edon_core::{IntentId, TenantId};
use edon_store::Store;

use crate::error::PolicyPackError;
use crate::pack::Pack;

/// Compile `pack`, persist it as a fresh Intent, and make it `tenant_id`'s
/// default (spec.md §4.10: "Apply returns the created `intent_id`;
/// subsequent `/clawdbot/invoke` calls without `X-Intent-ID` use this
/// default").
pub async fn apply<S: Store>(
    store: &S,
    tenant_id: &TenantId,
    pack: Pack,
) -> Result<IntentId, PolicyPackError> {
    let mut intent = pack.compile();
    intent.tenant_id = Some(tenant_id.clone());
    let intent_id = store.save_intent(intent).await?;
    store.set_tenant_default_intent(tenant_id, &intent_id).await?;
    Ok(intent_id)
}

/// Resolve a pack by name, for callers holding a raw string (e.g. the
/// `/policypacks/{name}/apply` request path parameter).
pub async fn apply_named<S: Store>(
    store: &S,
    tenant_id: &TenantId,
    pack_name: &str,
) -> Result<IntentId, PolicyPackError> {
    let pack = Pack::from_name(pack_name).ok_or_else(|| PolicyPackError::UnknownPack(pack_name.to_owned()))?;
    apply(store, tenant_id, pack).await
}
