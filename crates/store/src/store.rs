use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use edon_core::{
    Action, ActionFingerprint, AgentId, AuditEvent, Constraints, Credential, CredentialId,
    CredentialType, Decision, DecisionId, Escalation, EventId, Intent, IntentId, ReasonCode,
    RiskLevel, SafeAlternative, Tenant, TenantId, TenantStatus, Verdict, WindowGranularity,
};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::migrations;

/// Filters accepted by `query_audit_events` (spec.md §4.1).
#[derive(Debug, Clone, Default)]
pub struct AuditEventFilter {
    pub agent_id: Option<AgentId>,
    pub verdict: Option<Verdict>,
    pub intent_id: Option<IntentId>,
    pub limit: u32,
}

/// Filters accepted by `query_decisions`.
#[derive(Debug, Clone, Default)]
pub struct DecisionFilter {
    pub verdict: Option<Verdict>,
    pub action_fingerprint: Option<ActionFingerprint>,
    pub limit: u32,
}

/// Result of a `lookup_token` call.
#[derive(Debug, Clone)]
pub struct TokenBinding {
    pub agent_id: AgentId,
    pub last_used_at: DateTime<Utc>,
}

/// Integration connectivity snapshot (spec.md §4.1 `get_integration_status`).
#[derive(Debug, Clone)]
pub struct IntegrationStatusRow {
    pub connected: bool,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// The embedded relational persistence contract (spec.md §4.1), implemented
/// here over SQLite. Grounded on `StateStore`'s async-trait shape, with the
/// key/value interface replaced by the gateway's typed entity operations.
#[async_trait]
pub trait Store: Send + Sync {
    async fn save_intent(&self, intent: Intent) -> Result<IntentId, StoreError>;
    async fn get_intent(&self, intent_id: &IntentId) -> Result<Intent, StoreError>;
    async fn get_latest_intent(&self, tenant_id: Option<&TenantId>) -> Result<Intent, StoreError>;

    async fn save_audit_event(&self, event: AuditEvent, decision: Decision) -> Result<DecisionId, StoreError>;
    async fn query_audit_events(&self, filter: AuditEventFilter) -> Result<Vec<AuditEvent>, StoreError>;
    async fn query_decisions(&self, filter: DecisionFilter) -> Result<Vec<Decision>, StoreError>;
    async fn get_decision(&self, decision_id: &DecisionId) -> Result<Decision, StoreError>;

    async fn save_credential(&self, credential: Credential) -> Result<CredentialId, StoreError>;
    async fn delete_credential(&self, credential_id: &CredentialId) -> Result<(), StoreError>;
    async fn get_credential_by_id(&self, credential_id: &CredentialId) -> Result<Credential, StoreError>;
    async fn get_credential_by_tool(
        &self,
        tool_name: &str,
        tenant_id: Option<&TenantId>,
    ) -> Result<Credential, StoreError>;

    async fn increment_counter(
        &self,
        principal: &str,
        granularity: WindowGranularity,
        window_start: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
    async fn get_counter(
        &self,
        principal: &str,
        granularity: WindowGranularity,
        window_start: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    async fn bind_token(&self, token_hash: &str, agent_id: AgentId) -> Result<(), StoreError>;
    async fn lookup_token(&self, token_hash: &str) -> Result<Option<TokenBinding>, StoreError>;
    async fn touch_token(&self, token_hash: &str) -> Result<(), StoreError>;

    async fn get_integration_status(
        &self,
        tenant_id: &TenantId,
        tool: &str,
    ) -> Result<IntegrationStatusRow, StoreError>;

    async fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant, StoreError>;

    /// Upsert `tenant_id` (defaulting `plan`/`status` for a first-seen
    /// tenant) and point its `default_intent_id` at `intent_id`. Used by
    /// PolicyPack application (spec.md §4.10): "Apply returns the created
    /// `intent_id`" and makes it the tenant's default.
    async fn set_tenant_default_intent(
        &self,
        tenant_id: &TenantId,
        intent_id: &IntentId,
    ) -> Result<(), StoreError>;
}

/// SQLite-backed implementation of [`Store`]. Cheap to clone: `SqlitePool`
/// is a handle around a shared connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if absent) the SQLite database named in `config` and
    /// run migrations before returning. Any failure to open the underlying
    /// file is a fatal [`StoreError::StoreUnavailable`] per spec.md §4.1.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.connect_string())
            .await
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn save_intent(&self, mut intent: Intent) -> Result<IntentId, StoreError> {
        intent.updated_at = Utc::now();
        let scope_json = serde_json::to_string(&intent.scope).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let constraints_json =
            serde_json::to_string(&intent.constraints).map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO intents (intent_id, tenant_id, objective, scope_json, constraints_json, \
             risk_level, approved_by_user, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             ON CONFLICT(intent_id) DO UPDATE SET \
               tenant_id = excluded.tenant_id, objective = excluded.objective, \
               scope_json = excluded.scope_json, constraints_json = excluded.constraints_json, \
               risk_level = excluded.risk_level, approved_by_user = excluded.approved_by_user, \
               updated_at = excluded.updated_at",
        )
        .bind(intent.intent_id.as_str())
        .bind(intent.tenant_id.as_ref().map(edon_core::TenantId::as_str))
        .bind(&intent.objective)
        .bind(&scope_json)
        .bind(&constraints_json)
        .bind(risk_level_str(intent.risk_level))
        .bind(intent.approved_by_user)
        .bind(intent.created_at.to_rfc3339())
        .bind(intent.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(intent.intent_id)
    }

    async fn get_intent(&self, intent_id: &IntentId) -> Result<Intent, StoreError> {
        let row = sqlx::query("SELECT * FROM intents WHERE intent_id = ?1")
            .bind(intent_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("intent {intent_id}")))?;
        row_to_intent(&row)
    }

    async fn get_latest_intent(&self, tenant_id: Option<&TenantId>) -> Result<Intent, StoreError> {
        let row = match tenant_id {
            Some(tenant_id) => {
                sqlx::query("SELECT * FROM intents WHERE tenant_id = ?1 ORDER BY updated_at DESC LIMIT 1")
                    .bind(tenant_id.as_str())
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM intents ORDER BY updated_at DESC LIMIT 1")
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        let row = row.ok_or_else(|| StoreError::NotFound("no intents saved".to_owned()))?;
        row_to_intent(&row)
    }

    async fn save_audit_event(&self, event: AuditEvent, decision: Decision) -> Result<DecisionId, StoreError> {
        let mut tx = self.pool.begin().await?;

        let safe_alt_json = decision
            .safe_alternative
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let escalation_json = decision
            .escalation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO decisions (decision_id, action_fingerprint, verdict, reason_code, \
             explanation, safe_alternative_json, escalation_json, computed_risk, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(decision.decision_id.as_str())
        .bind(decision.action_fingerprint.as_str())
        .bind(verdict_str(decision.verdict))
        .bind(reason_code_str(decision.reason_code))
        .bind(&decision.explanation)
        .bind(&safe_alt_json)
        .bind(&escalation_json)
        .bind(risk_level_str(decision.computed_risk))
        .bind(decision.timestamp.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO audit_events (event_id, decision_id, verdict, tenant_id, agent_id, \
             intent_id, action_snapshot_json, context_snapshot_json, timestamp, latency_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(event.event_id.as_str())
        .bind(event.decision_id.as_str())
        .bind(verdict_str(event.verdict))
        .bind(event.tenant_id.as_ref().map(edon_core::TenantId::as_str))
        .bind(event.agent_id.as_ref().map(edon_core::AgentId::as_str))
        .bind(event.intent_id.as_ref().map(edon_core::IntentId::as_str))
        .bind(event.action_snapshot.to_string())
        .bind(event.context_snapshot.to_string())
        .bind(event.timestamp.to_rfc3339())
        .bind(i64::try_from(event.latency_ms).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(decision.decision_id)
    }

    async fn query_audit_events(&self, filter: AuditEventFilter) -> Result<Vec<AuditEvent>, StoreError> {
        let limit = filter.limit.clamp(1, 1000);
        let mut query = String::from(
            "SELECT * FROM audit_events WHERE 1=1",
        );
        if filter.agent_id.is_some() {
            query.push_str(" AND agent_id = ?");
        }
        if filter.verdict.is_some() {
            query.push_str(" AND verdict = ?");
        }
        if filter.intent_id.is_some() {
            query.push_str(" AND intent_id = ?");
        }
        query.push_str(" ORDER BY timestamp DESC LIMIT ?");

        let mut q = sqlx::query(&query);
        if let Some(agent_id) = &filter.agent_id {
            q = q.bind(agent_id.as_str());
        }
        if let Some(verdict) = filter.verdict {
            q = q.bind(verdict_str(verdict));
        }
        if let Some(intent_id) = &filter.intent_id {
            q = q.bind(intent_id.as_str());
        }
        q = q.bind(i64::from(limit));

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_audit_event).collect()
    }

    async fn query_decisions(&self, filter: DecisionFilter) -> Result<Vec<Decision>, StoreError> {
        let limit = filter.limit.clamp(1, 1000);
        let mut query = String::from("SELECT * FROM decisions WHERE 1=1");
        if filter.verdict.is_some() {
            query.push_str(" AND verdict = ?");
        }
        if filter.action_fingerprint.is_some() {
            query.push_str(" AND action_fingerprint = ?");
        }
        query.push_str(" ORDER BY timestamp DESC LIMIT ?");

        let mut q = sqlx::query(&query);
        if let Some(verdict) = filter.verdict {
            q = q.bind(verdict_str(verdict));
        }
        if let Some(fp) = &filter.action_fingerprint {
            q = q.bind(fp.as_str());
        }
        q = q.bind(i64::from(limit));

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_decision).collect()
    }

    async fn get_decision(&self, decision_id: &DecisionId) -> Result<Decision, StoreError> {
        let row = sqlx::query("SELECT * FROM decisions WHERE decision_id = ?1")
            .bind(decision_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("decision {decision_id}")))?;
        row_to_decision(&row)
    }

    async fn save_credential(&self, credential: Credential) -> Result<CredentialId, StoreError> {
        sqlx::query(
            "INSERT INTO credentials (credential_id, tool_name, tenant_id, credential_type, \
             payload_blob, encrypted_flag, created_at, updated_at, last_used_at, last_error) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT(credential_id) DO UPDATE SET \
               payload_blob = excluded.payload_blob, encrypted_flag = excluded.encrypted_flag, \
               updated_at = excluded.updated_at",
        )
        .bind(credential.credential_id.as_str())
        .bind(&credential.tool_name)
        .bind(credential.tenant_id.as_ref().map(edon_core::TenantId::as_str))
        .bind(credential_type_str(credential.credential_type))
        .bind(credential.payload_blob.to_string())
        .bind(credential.encrypted_flag)
        .bind(credential.created_at.to_rfc3339())
        .bind(credential.updated_at.to_rfc3339())
        .bind(credential.last_used_at.map(|t| t.to_rfc3339()))
        .bind(&credential.last_error)
        .execute(&self.pool)
        .await?;

        Ok(credential.credential_id)
    }

    async fn delete_credential(&self, credential_id: &CredentialId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM credentials WHERE credential_id = ?1")
            .bind(credential_id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("credential {credential_id}")));
        }
        Ok(())
    }

    async fn get_credential_by_id(&self, credential_id: &CredentialId) -> Result<Credential, StoreError> {
        let row = sqlx::query("SELECT * FROM credentials WHERE credential_id = ?1")
            .bind(credential_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("credential {credential_id}")))?;
        row_to_credential(&row)
    }

    async fn get_credential_by_tool(
        &self,
        tool_name: &str,
        tenant_id: Option<&TenantId>,
    ) -> Result<Credential, StoreError> {
        let row = match tenant_id {
            Some(tenant_id) => {
                sqlx::query("SELECT * FROM credentials WHERE tool_name = ?1 AND tenant_id = ?2")
                    .bind(tool_name)
                    .bind(tenant_id.as_str())
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM credentials WHERE tool_name = ?1 AND tenant_id IS NULL")
                    .bind(tool_name)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        let row = row.ok_or_else(|| StoreError::NotFound(format!("credential for tool {tool_name}")))?;
        row_to_credential(&row)
    }

    async fn increment_counter(
        &self,
        principal: &str,
        granularity: WindowGranularity,
        window_start: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        // INSERT ... ON CONFLICT DO UPDATE is atomic under SQLite's
        // single-writer transaction model, satisfying the spec's
        // "MUST be atomic under concurrency" requirement.
        let row = sqlx::query(
            "INSERT INTO counters (principal, granularity, window_start, value) \
             VALUES (?1, ?2, ?3, 1) \
             ON CONFLICT(principal, granularity, window_start) DO UPDATE SET value = value + 1 \
             RETURNING value",
        )
        .bind(principal)
        .bind(granularity_str(granularity))
        .bind(window_start.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        row.try_get::<i64, _>("value").map_err(StoreError::from)
    }

    async fn get_counter(
        &self,
        principal: &str,
        granularity: WindowGranularity,
        window_start: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "SELECT value FROM counters WHERE principal = ?1 AND granularity = ?2 AND window_start = ?3",
        )
        .bind(principal)
        .bind(granularity_str(granularity))
        .bind(window_start.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_get::<i64, _>("value").map_err(StoreError::from),
            None => Ok(0),
        }
    }

    async fn bind_token(&self, token_hash: &str, agent_id: AgentId) -> Result<(), StoreError> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT agent_id FROM token_agent_bindings WHERE token_hash = ?1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;

        if let Some((existing_agent,)) = existing {
            if existing_agent != agent_id.as_str() {
                return Err(StoreError::Conflict(format!(
                    "token already bound to agent {existing_agent}"
                )));
            }
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO token_agent_bindings (token_hash, agent_id, created_at, last_used_at) \
             VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(token_hash)
        .bind(agent_id.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lookup_token(&self, token_hash: &str) -> Result<Option<TokenBinding>, StoreError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT agent_id, last_used_at FROM token_agent_bindings WHERE token_hash = ?1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(agent_id, last_used_at)| TokenBinding {
            agent_id: AgentId::from(agent_id),
            last_used_at: parse_timestamp(&last_used_at),
        }))
    }

    async fn touch_token(&self, token_hash: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE token_agent_bindings SET last_used_at = ?1 WHERE token_hash = ?2")
            .bind(Utc::now().to_rfc3339())
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_integration_status(
        &self,
        tenant_id: &TenantId,
        tool: &str,
    ) -> Result<IntegrationStatusRow, StoreError> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT last_used_at, last_error FROM credentials WHERE tenant_id = ?1 AND tool_name = ?2",
        )
        .bind(tenant_id.as_str())
        .bind(tool)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((last_used_at, last_error)) => Ok(IntegrationStatusRow {
                connected: last_used_at.is_some(),
                last_ok_at: last_used_at.map(|t| parse_timestamp(&t)),
                last_error,
            }),
            None => Ok(IntegrationStatusRow {
                connected: false,
                last_ok_at: None,
                last_error: None,
            }),
        }
    }

    async fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant, StoreError> {
        let row: Option<(String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT tenant_id, plan, status, default_intent_id FROM tenants WHERE tenant_id = ?1",
        )
        .bind(tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let (tenant_id, plan, status, default_intent_id) =
            row.ok_or_else(|| StoreError::NotFound(format!("tenant {tenant_id}")))?;

        Ok(Tenant {
            tenant_id: TenantId::from(tenant_id),
            plan,
            status: parse_tenant_status(&status)?,
            default_intent_id: default_intent_id.map(IntentId::from),
        })
    }

    async fn set_tenant_default_intent(
        &self,
        tenant_id: &TenantId,
        intent_id: &IntentId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tenants (tenant_id, plan, status, default_intent_id) \
             VALUES (?1, 'default', 'active', ?2) \
             ON CONFLICT(tenant_id) DO UPDATE SET default_intent_id = excluded.default_intent_id",
        )
        .bind(tenant_id.as_str())
        .bind(intent_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn risk_level_str(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
        RiskLevel::Critical => "critical",
    }
}

fn parse_risk_level(value: &str) -> Result<RiskLevel, StoreError> {
    match value {
        "low" => Ok(RiskLevel::Low),
        "medium" => Ok(RiskLevel::Medium),
        "high" => Ok(RiskLevel::High),
        "critical" => Ok(RiskLevel::Critical),
        other => Err(StoreError::Serialization(format!("unknown risk level {other}"))),
    }
}

fn verdict_str(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Allow => "ALLOW",
        Verdict::Degrade => "DEGRADE",
        Verdict::Escalate => "ESCALATE",
        Verdict::Block => "BLOCK",
        Verdict::Pause => "PAUSE",
    }
}

fn parse_verdict(value: &str) -> Result<Verdict, StoreError> {
    match value {
        "ALLOW" => Ok(Verdict::Allow),
        "DEGRADE" => Ok(Verdict::Degrade),
        "ESCALATE" => Ok(Verdict::Escalate),
        "BLOCK" => Ok(Verdict::Block),
        "PAUSE" => Ok(Verdict::Pause),
        other => Err(StoreError::Serialization(format!("unknown verdict {other}"))),
    }
}

fn reason_code_str(reason: ReasonCode) -> &'static str {
    match reason {
        ReasonCode::Approved => "APPROVED",
        ReasonCode::DegradedToSafeAlternative => "DEGRADED_TO_SAFE_ALTERNATIVE",
        ReasonCode::NeedConfirmation => "NEED_CONFIRMATION",
        ReasonCode::IntentNotApproved => "INTENT_NOT_APPROVED",
        ReasonCode::ScopeViolation => "SCOPE_VIOLATION",
        ReasonCode::RiskTooHigh => "RISK_TOO_HIGH",
        ReasonCode::DataExfil => "DATA_EXFIL",
        ReasonCode::OutOfHours => "OUT_OF_HOURS",
        ReasonCode::LoopDetected => "LOOP_DETECTED",
        ReasonCode::RateLimit => "RATE_LIMIT",
    }
}

fn parse_reason_code(value: &str) -> Result<ReasonCode, StoreError> {
    Ok(match value {
        "APPROVED" => ReasonCode::Approved,
        "DEGRADED_TO_SAFE_ALTERNATIVE" => ReasonCode::DegradedToSafeAlternative,
        "NEED_CONFIRMATION" => ReasonCode::NeedConfirmation,
        "INTENT_NOT_APPROVED" => ReasonCode::IntentNotApproved,
        "SCOPE_VIOLATION" => ReasonCode::ScopeViolation,
        "RISK_TOO_HIGH" => ReasonCode::RiskTooHigh,
        "DATA_EXFIL" => ReasonCode::DataExfil,
        "OUT_OF_HOURS" => ReasonCode::OutOfHours,
        "LOOP_DETECTED" => ReasonCode::LoopDetected,
        "RATE_LIMIT" => ReasonCode::RateLimit,
        other => return Err(StoreError::Serialization(format!("unknown reason code {other}"))),
    })
}

fn credential_type_str(kind: CredentialType) -> &'static str {
    match kind {
        CredentialType::BotGateway => "bot_gateway",
        CredentialType::Email => "email",
        CredentialType::ApiKey => "api_key",
    }
}

fn parse_credential_type(value: &str) -> Result<CredentialType, StoreError> {
    Ok(match value {
        "bot_gateway" => CredentialType::BotGateway,
        "email" => CredentialType::Email,
        "api_key" => CredentialType::ApiKey,
        other => return Err(StoreError::Serialization(format!("unknown credential type {other}"))),
    })
}

fn granularity_str(granularity: WindowGranularity) -> &'static str {
    match granularity {
        WindowGranularity::Minute => "minute",
        WindowGranularity::Hour => "hour",
        WindowGranularity::Day => "day",
    }
}

fn parse_tenant_status(value: &str) -> Result<TenantStatus, StoreError> {
    Ok(match value {
        "active" => TenantStatus::Active,
        "inactive" => TenantStatus::Inactive,
        "suspended" => TenantStatus::Suspended,
        other => return Err(StoreError::Serialization(format!("unknown tenant status {other}"))),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_intent(row: &sqlx::sqlite::SqliteRow) -> Result<Intent, StoreError> {
    let scope_json: String = row.try_get("scope_json")?;
    let constraints_json: String = row.try_get("constraints_json")?;
    let risk_level: String = row.try_get("risk_level")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let tenant_id: Option<String> = row.try_get("tenant_id")?;

    Ok(Intent {
        intent_id: IntentId::from(row.try_get::<String, _>("intent_id")?),
        tenant_id: tenant_id.map(TenantId::from),
        objective: row.try_get("objective")?,
        scope: serde_json::from_str(&scope_json).map_err(|e| StoreError::Serialization(e.to_string()))?,
        constraints: serde_json::from_str::<Constraints>(&constraints_json)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        risk_level: parse_risk_level(&risk_level)?,
        approved_by_user: row.try_get("approved_by_user")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn row_to_decision(row: &sqlx::sqlite::SqliteRow) -> Result<Decision, StoreError> {
    let safe_alt_json: Option<String> = row.try_get("safe_alternative_json")?;
    let escalation_json: Option<String> = row.try_get("escalation_json")?;

    Ok(Decision {
        decision_id: DecisionId::from(row.try_get::<String, _>("decision_id")?),
        action_fingerprint: ActionFingerprint::from(row.try_get::<String, _>("action_fingerprint")?),
        verdict: parse_verdict(&row.try_get::<String, _>("verdict")?)?,
        reason_code: parse_reason_code(&row.try_get::<String, _>("reason_code")?)?,
        explanation: row.try_get("explanation")?,
        safe_alternative: safe_alt_json
            .map(|s| serde_json::from_str::<SafeAlternative>(&s))
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        escalation: escalation_json
            .map(|s| serde_json::from_str::<Escalation>(&s))
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        computed_risk: parse_risk_level(&row.try_get::<String, _>("computed_risk")?)?,
        timestamp: parse_timestamp(&row.try_get::<String, _>("timestamp")?),
    })
}

fn row_to_audit_event(row: &sqlx::sqlite::SqliteRow) -> Result<AuditEvent, StoreError> {
    let action_snapshot: String = row.try_get("action_snapshot_json")?;
    let context_snapshot: String = row.try_get("context_snapshot_json")?;
    let tenant_id: Option<String> = row.try_get("tenant_id")?;
    let agent_id: Option<String> = row.try_get("agent_id")?;
    let intent_id: Option<String> = row.try_get("intent_id")?;
    let latency_ms: i64 = row.try_get("latency_ms")?;

    Ok(AuditEvent {
        event_id: EventId::from(row.try_get::<String, _>("event_id")?),
        decision_id: DecisionId::from(row.try_get::<String, _>("decision_id")?),
        verdict: parse_verdict(&row.try_get::<String, _>("verdict")?)?,
        tenant_id: tenant_id.map(TenantId::from),
        agent_id: agent_id.map(AgentId::from),
        intent_id: intent_id.map(IntentId::from),
        action_snapshot: serde_json::from_str(&action_snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        context_snapshot: serde_json::from_str(&context_snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        timestamp: parse_timestamp(&row.try_get::<String, _>("timestamp")?),
        latency_ms: u64::try_from(latency_ms).unwrap_or(0),
    })
}

fn row_to_credential(row: &sqlx::sqlite::SqliteRow) -> Result<Credential, StoreError> {
    let payload_blob: String = row.try_get("payload_blob")?;
    let tenant_id: Option<String> = row.try_get("tenant_id")?;
    let last_used_at: Option<String> = row.try_get("last_used_at")?;

    Ok(Credential {
        credential_id: CredentialId::from(row.try_get::<String, _>("credential_id")?),
        tool_name: row.try_get("tool_name")?,
        tenant_id: tenant_id.map(TenantId::from),
        credential_type: parse_credential_type(&row.try_get::<String, _>("credential_type")?)?,
        payload_blob: serde_json::from_str(&payload_blob).map_err(|e| StoreError::Serialization(e.to_string()))?,
        encrypted_flag: row.try_get("encrypted_flag")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?),
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?),
        last_used_at: last_used_at.map(|t| parse_timestamp(&t)),
        last_error: row.try_get("last_error")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use edon_core::Action;

    async fn test_store() -> SqliteStore {
        let config = StoreConfig {
            database_path: ":memory:".into(),
            pool_size: 1,
        };
        SqliteStore::connect(&config).await.expect("in-memory store should connect")
    }

    #[tokio::test]
    async fn save_and_get_intent_roundtrip() {
        let store = test_store().await;
        let mut intent = Intent::new("test objective", RiskLevel::Low);
        intent.scope.insert("email".into(), vec!["send".into()]);
        let id = store.save_intent(intent.clone()).await.unwrap();

        let fetched = store.get_intent(&id).await.unwrap();
        assert_eq!(fetched.objective, "test objective");
        assert!(fetched.allows("email", "send"));
    }

    #[tokio::test]
    async fn get_intent_missing_is_not_found() {
        let store = test_store().await;
        let result = store.get_intent(&IntentId::from("missing")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_audit_event_writes_both_tables_atomically() {
        let store = test_store().await;
        let intent = Intent::new("test", RiskLevel::Low);
        let action = Action::new("email", "read", serde_json::Value::Null);
        let fingerprint = edon_core::compute_fingerprint(&action, &intent.intent_id);

        let decision = Decision {
            decision_id: DecisionId::generate(),
            action_fingerprint: fingerprint,
            verdict: Verdict::Allow,
            reason_code: ReasonCode::Approved,
            explanation: "ok".into(),
            safe_alternative: None,
            escalation: None,
            computed_risk: RiskLevel::Low,
            timestamp: Utc::now(),
        };
        let event = AuditEvent {
            event_id: EventId::generate(),
            decision_id: decision.decision_id.clone(),
            verdict: Verdict::Allow,
            tenant_id: None,
            agent_id: None,
            intent_id: Some(intent.intent_id.clone()),
            action_snapshot: serde_json::json!({"tool": "email"}),
            context_snapshot: serde_json::json!({}),
            timestamp: Utc::now(),
            latency_ms: 5,
        };

        let decision_id = store.save_audit_event(event, decision).await.unwrap();
        let fetched = store.get_decision(&decision_id).await.unwrap();
        assert_eq!(fetched.verdict, Verdict::Allow);

        let events = store
            .query_audit_events(AuditEventFilter { limit: 10, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn counter_increments_are_sequential() {
        let store = test_store().await;
        let window = WindowGranularity::Minute.bucket_start(Utc::now());
        let first = store.increment_counter("agent-1", WindowGranularity::Minute, window).await.unwrap();
        let second = store.increment_counter("agent-1", WindowGranularity::Minute, window).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let read_back = store.get_counter("agent-1", WindowGranularity::Minute, window).await.unwrap();
        assert_eq!(read_back, 2);
    }

    #[tokio::test]
    async fn get_counter_absent_window_is_zero() {
        let store = test_store().await;
        let window = WindowGranularity::Hour.bucket_start(Utc::now());
        let value = store.get_counter("nobody", WindowGranularity::Hour, window).await.unwrap();
        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn token_binding_is_fixed_on_first_use() {
        let store = test_store().await;
        store.bind_token("hash-1", AgentId::from("agent-a")).await.unwrap();

        let conflicting = store.bind_token("hash-1", AgentId::from("agent-b")).await;
        assert!(matches!(conflicting, Err(StoreError::Conflict(_))));

        let rebind_same = store.bind_token("hash-1", AgentId::from("agent-a")).await;
        assert!(rebind_same.is_ok());
    }

    #[tokio::test]
    async fn lookup_token_returns_binding() {
        let store = test_store().await;
        store.bind_token("hash-2", AgentId::from("agent-c")).await.unwrap();
        let binding = store.lookup_token("hash-2").await.unwrap().unwrap();
        assert_eq!(binding.agent_id.as_str(), "agent-c");
    }

    #[tokio::test]
    async fn credential_delete_then_get_is_not_found() {
        let store = test_store().await;
        let credential = Credential {
            credential_id: CredentialId::from("cred-1"),
            tool_name: "email".into(),
            tenant_id: None,
            credential_type: CredentialType::Email,
            payload_blob: serde_json::json!({"smtp": "x"}),
            encrypted_flag: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_used_at: None,
            last_error: None,
        };
        store.save_credential(credential).await.unwrap();
        store.delete_credential(&CredentialId::from("cred-1")).await.unwrap();
        let result = store.get_credential_by_id(&CredentialId::from("cred-1")).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn integration_status_connected_survives_last_error() {
        let store = test_store().await;
        let credential = Credential {
            credential_id: CredentialId::from("cred-2"),
            tool_name: "clawdbot".into(),
            tenant_id: Some(TenantId::from("tenant-1")),
            credential_type: CredentialType::BotGateway,
            payload_blob: serde_json::json!({}),
            encrypted_flag: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_used_at: Some(Utc::now()),
            last_error: Some("timeout".into()),
        };
        store.save_credential(credential).await.unwrap();

        let status = store
            .get_integration_status(&TenantId::from("tenant-1"), "clawdbot")
            .await
            .unwrap();
        assert!(status.connected);
        assert_eq!(status.last_error.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn set_tenant_default_intent_creates_tenant_if_absent() {
        let store = test_store().await;
        let tenant_id = TenantId::from("tenant-new");
        let intent_id = IntentId::from("intent-1");
        store.set_tenant_default_intent(&tenant_id, &intent_id).await.unwrap();

        let tenant = store.get_tenant(&tenant_id).await.unwrap();
        assert_eq!(tenant.default_intent_id, Some(intent_id));
    }

    #[tokio::test]
    async fn set_tenant_default_intent_updates_existing_tenant() {
        let store = test_store().await;
        let tenant_id = TenantId::from("tenant-existing");
        store
            .set_tenant_default_intent(&tenant_id, &IntentId::from("intent-old"))
            .await
            .unwrap();
        store
            .set_tenant_default_intent(&tenant_id, &IntentId::from("intent-new"))
            .await
            .unwrap();

        let tenant = store.get_tenant(&tenant_id).await.unwrap();
        assert_eq!(tenant.default_intent_id, Some(IntentId::from("intent-new")));
    }
}
