use sqlx::SqlitePool;

use crate::error::StoreError;

/// Current schema version this binary expects. `schema_version` is bumped
/// to this value once every statement below has run successfully.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Create all tables and indices named in spec.md §4.1 if they do not
/// already exist, then record `CURRENT_SCHEMA_VERSION`. Idempotent: safe to
/// call on every startup. Missing migrations MUST be applied before the
/// first request is served (spec.md §4.1 "Startup").
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    let mut tx = pool.begin().await.map_err(StoreError::from)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tenants (
            tenant_id TEXT PRIMARY KEY,
            plan TEXT NOT NULL,
            status TEXT NOT NULL,
            default_intent_id TEXT
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS intents (
            intent_id TEXT PRIMARY KEY,
            tenant_id TEXT,
            objective TEXT NOT NULL,
            scope_json TEXT NOT NULL,
            constraints_json TEXT NOT NULL,
            risk_level TEXT NOT NULL,
            approved_by_user INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS decisions (
            decision_id TEXT PRIMARY KEY,
            action_fingerprint TEXT NOT NULL,
            verdict TEXT NOT NULL,
            reason_code TEXT NOT NULL,
            explanation TEXT NOT NULL,
            safe_alternative_json TEXT,
            escalation_json TEXT,
            computed_risk TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS audit_events (
            event_id TEXT PRIMARY KEY,
            decision_id TEXT NOT NULL REFERENCES decisions(decision_id),
            verdict TEXT NOT NULL,
            tenant_id TEXT,
            agent_id TEXT,
            intent_id TEXT,
            action_snapshot_json TEXT NOT NULL,
            context_snapshot_json TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            latency_ms INTEGER NOT NULL
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS credentials (
            credential_id TEXT PRIMARY KEY,
            tool_name TEXT NOT NULL,
            tenant_id TEXT,
            credential_type TEXT NOT NULL,
            payload_blob TEXT NOT NULL,
            encrypted_flag INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_used_at TEXT,
            last_error TEXT
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS token_agent_bindings (
            token_hash TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_used_at TEXT NOT NULL
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS counters (
            principal TEXT NOT NULL,
            granularity TEXT NOT NULL,
            window_start TEXT NOT NULL,
            value INTEGER NOT NULL,
            PRIMARY KEY (principal, granularity, window_start)
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS telegram_connect_codes (
            code TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            agent_id TEXT,
            created_at TEXT NOT NULL,
            consumed_at TEXT
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_events_timestamp ON audit_events(timestamp)")
        .execute(&mut *tx)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_events_agent_id ON audit_events(agent_id)")
        .execute(&mut *tx)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_events_intent_id ON audit_events(intent_id)")
        .execute(&mut *tx)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_events_verdict ON audit_events(verdict)")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_decisions_action_fingerprint ON decisions(action_fingerprint)",
    )
    .execute(&mut *tx)
    .await?;

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
        .fetch_optional(&mut *tx)
        .await?;
    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (?1)")
                .bind(CURRENT_SCHEMA_VERSION)
                .execute(&mut *tx)
                .await?;
        }
        Some((existing,)) if existing < CURRENT_SCHEMA_VERSION => {
            sqlx::query("UPDATE schema_version SET version = ?1")
                .bind(CURRENT_SCHEMA_VERSION)
                .execute(&mut *tx)
                .await?;
        }
        Some(_) => {}
    }

    tx.commit().await.map_err(StoreError::from)?;
    Ok(())
}
