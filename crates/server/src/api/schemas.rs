use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use edon_core::{Action, Constraints, Escalation, ReasonCode, RiskLevel, Scope, Verdict};

/// `execution` block embedded in a [`DecisionEnvelope`] when the verdict is
/// executable (spec.md §6). Absent/null for every other verdict.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecutionBlock {
    pub tool: String,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub observation: Option<serde_json::Value>,
}

/// Response body of `POST /execute` and `POST /clawdbot/invoke` (spec.md §6).
/// `execution` MUST be absent or null when `verdict ∉ {ALLOW, DEGRADE}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionEnvelope {
    pub verdict: Verdict,
    pub decision_id: String,
    pub reason_code: ReasonCode,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionBlock>,
}

/// `POST /execute` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExecuteRequest {
    pub tool: String,
    pub op: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub estimated_risk: Option<RiskLevel>,
}

/// `POST /clawdbot/invoke` request body — the inner tool/action/args wrapped
/// by the `clawdbot` Action before reaching the Governor.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClawdbotInvokeRequest {
    pub tool: String,
    pub action: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub args: serde_json::Value,
    #[serde(default)]
    pub session_key: Option<String>,
}

/// `POST /intent/set` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetIntentRequest {
    pub objective: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub scope: Scope,
    #[serde(default)]
    pub constraints: Constraints,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub approved_by_user: bool,
}

/// `GET /intent/get` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntentResponse {
    pub intent_id: String,
    pub objective: String,
    #[schema(value_type = Object)]
    pub scope: Scope,
    pub constraints: Constraints,
    pub risk_level: RiskLevel,
    pub approved_by_user: bool,
}

impl From<ExecuteRequest> for Action {
    fn from(req: ExecuteRequest) -> Self {
        let mut action = Action::new(req.tool, req.op, req.params);
        action.estimated_risk = req.estimated_risk;
        action
    }
}

/// `POST /credentials/set` request body. Write-only: there is no
/// corresponding GET that returns `payload`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetCredentialRequest {
    pub credential_id: String,
    pub tool_name: String,
    pub credential_type: edon_core::CredentialType,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub encrypt: bool,
}

/// `POST /policy-packs/{name}/apply` response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplyPackResponse {
    pub intent_id: String,
}

/// `GET /policy-packs` response body entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PolicyPackSummary {
    pub name: String,
}

/// `POST /integrations/clawdbot/connect` request body (spec.md §6: `{base_url,
/// auth_mode, secret}`, with the legacy `{gateway_url, gateway_token}` shape
/// also accepted for backward compatibility).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ConnectClawdbotRequest {
    Current {
        base_url: String,
        auth_mode: AuthMode,
        secret: String,
    },
    Legacy {
        gateway_url: String,
        gateway_token: String,
    },
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Password,
    Token,
}

impl ConnectClawdbotRequest {
    /// Normalize either shape into `(base_url, secret)`.
    #[must_use]
    pub fn into_base_url_and_secret(self) -> (String, String) {
        match self {
            Self::Current { base_url, secret, .. } => (base_url, secret),
            Self::Legacy { gateway_url, gateway_token } => (gateway_url, gateway_token),
        }
    }
}

/// `GET /account/integrations` response body (spec.md §4.11).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntegrationAccountStatus {
    pub connected: bool,
    pub reachability: crate::anti_bypass::Reachability,
    pub bypass_risk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// `GET /benchmark/trust-spec` response body (spec.md §4.12).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrustSpecBenchmark {
    pub latency_overhead_ms: u64,
    pub block_rate: f64,
    pub bypass_resistance_score: u8,
}

/// `POST /plan` response body: a non-executing step decomposition. Each
/// step is evaluated through `resolve_intent` + Governor but never
/// dispatched to a Connector.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanStepResult {
    pub tool: String,
    pub op: String,
    pub verdict: Verdict,
    pub reason_code: ReasonCode,
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlanRequest {
    pub steps: Vec<ExecuteRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanResponse {
    pub steps: Vec<PlanStepResult>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

/// Generic JSON error body every non-2xx response carries (spec.md §7).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}
