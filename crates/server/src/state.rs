use std::sync::Arc;

use edon_auditor::Auditor;
use edon_connectors::ConnectorRegistry;
use edon_ratelimit::RateLimiter;
use edon_store::SqliteStore;
use edon_vault::Vault;

use crate::config::GatewayConfig;
use crate::metrics::Metrics;

/// Shared application state handed to every handler via axum's `State`
/// extractor. Cheap to clone: every field is an `Arc` or an already-cheap
/// `SqliteStore` handle.
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub vault: Arc<Vault<SqliteStore>>,
    pub auditor: Arc<Auditor<SqliteStore>>,
    pub rate_limiter: Arc<RateLimiter<SqliteStore>>,
    pub connectors: Arc<ConnectorRegistry>,
    pub config: Arc<GatewayConfig>,
    pub metrics: Arc<Metrics>,
}
