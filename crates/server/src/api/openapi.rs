use edon_core::{Action, AuditEvent, Constraints, Decision, Escalation, EscalationOption, Intent, ReasonCode, RiskLevel, SafeAlternative, Verdict};

use super::schemas::{
    ApplyPackResponse, ClawdbotInvokeRequest, ConnectClawdbotRequest, DecisionEnvelope, ExecuteRequest, ExecutionBlock,
    IntegrationAccountStatus, IntentResponse, PlanRequest, PlanResponse, PlanStepResult, PolicyPackSummary,
    SetCredentialRequest, SetIntentRequest, TrustSpecBenchmark, VersionResponse,
};
use crate::metrics::MetricsSnapshot;

/// Aggregated OpenAPI document, served at `/openapi.json` alongside the
/// Swagger UI at `/docs` (spec.md §6: "a machine-readable OpenAPI document").
#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Edon Gateway API",
        version = "0.1.0",
        description = "Policy-enforcement gateway that mediates every tool call an AI agent makes.",
        license(name = "MIT")
    ),
    tags(
        (name = "Health", description = "Liveness and build identity"),
        (name = "Intents", description = "Tenant intent management"),
        (name = "Execute", description = "Action evaluation and dispatch"),
        (name = "Audit", description = "Audit trail query"),
        (name = "Decisions", description = "Decision log query"),
        (name = "Credentials", description = "Write-only credential vault"),
        (name = "Policy Packs", description = "Named intent presets"),
        (name = "Integrations", description = "Downstream connector connectivity"),
        (name = "Metrics", description = "Operational counters and benchmarks"),
        (name = "Plan", description = "Non-executing step decomposition")
    ),
    paths(
        super::health::health,
        super::health::version,
        super::intent::set_intent,
        super::intent::get_intent,
        super::execute::execute,
        super::clawdbot::invoke,
        super::audit::query_audit,
        super::decisions::query_decisions,
        super::decisions::get_decision,
        super::credentials::set_credential,
        super::credentials::delete_credential,
        super::policy_packs::list_packs,
        super::policy_packs::apply_pack,
        super::integrations::connect_clawdbot,
        super::integrations::account_integrations,
        super::metrics::metrics_json,
        super::metrics::metrics_prometheus,
        super::metrics::trust_spec,
        super::plan::plan,
    ),
    components(schemas(
        Action,
        AuditEvent,
        Constraints,
        Decision,
        Escalation,
        EscalationOption,
        Intent,
        ReasonCode,
        RiskLevel,
        SafeAlternative,
        Verdict,
        ApplyPackResponse,
        ClawdbotInvokeRequest,
        ConnectClawdbotRequest,
        DecisionEnvelope,
        ExecuteRequest,
        ExecutionBlock,
        IntegrationAccountStatus,
        IntentResponse,
        MetricsSnapshot,
        PlanRequest,
        PlanResponse,
        PlanStepResult,
        PolicyPackSummary,
        SetCredentialRequest,
        SetIntentRequest,
        TrustSpecBenchmark,
        VersionResponse,
    ))
)]
pub struct ApiDoc;
