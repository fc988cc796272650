use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use edon_policypacks::PolicyPackError;
use edon_store::StoreError;
use edon_validator::ValidationError;
use edon_vault::VaultError;

/// Typed HTTP errors produced by the pipeline (spec.md §7). Each variant
/// maps to exactly one status code; nothing here may be rewrapped as 500.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("authentication required")]
    AuthMissing,

    #[error("invalid authentication token")]
    AuthInvalid,

    #[error("tenant is not active")]
    Forbidden,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("request body exceeds the maximum allowed size")]
    PayloadTooLarge,

    #[error("rate limit exceeded")]
    RateLimited { retry_after_seconds: i64 },

    #[error("no credential configured for tool {0}")]
    CredentialMissing(String),

    #[error("downstream service unavailable: {0}")]
    DownstreamUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(detail) => Self::ValidationFailed(detail),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<VaultError> for ServerError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::CredentialMissing(tool) => Self::CredentialMissing(tool),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::BodyTooLarge { .. } => Self::PayloadTooLarge,
            other => Self::ValidationFailed(other.to_string()),
        }
    }
}

impl From<PolicyPackError> for ServerError {
    fn from(err: PolicyPackError) -> Self {
        match err {
            PolicyPackError::UnknownPack(name) => Self::ValidationFailed(format!("unknown policy pack: {name}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::AuthMissing | Self::AuthInvalid => {
                // Same body shape for both so a caller can never distinguish
                // "no token" from "wrong token" (spec.md §7).
                (StatusCode::UNAUTHORIZED, axum::Json(serde_json::json!({"detail": "Invalid authentication token"})))
                    .into_response()
            }
            Self::Forbidden => (StatusCode::FORBIDDEN, axum::Json(serde_json::json!({"detail": "tenant is not active"})))
                .into_response(),
            Self::ValidationFailed(detail) => {
                (StatusCode::BAD_REQUEST, axum::Json(serde_json::json!({"detail": detail}))).into_response()
            }
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                axum::Json(serde_json::json!({"detail": "request body too large"})),
            )
                .into_response(),
            Self::RateLimited { retry_after_seconds } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    axum::Json(serde_json::json!({
                        "detail": "rate limit exceeded",
                        "retry_after_seconds": retry_after_seconds,
                    })),
                )
                    .into_response();
                if let Ok(value) = axum::http::HeaderValue::from_str(&retry_after_seconds.to_string()) {
                    response.headers_mut().insert(axum::http::header::RETRY_AFTER, value);
                }
                response
            }
            Self::CredentialMissing(tool) => (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({"detail": format!("no credential configured for tool {tool}")})),
            )
                .into_response(),
            Self::DownstreamUnavailable(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, axum::Json(serde_json::json!({"detail": detail}))).into_response()
            }
            Self::Config(detail) => {
                tracing::error!(error = %detail, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(serde_json::json!({"detail": "Internal server error"})))
                    .into_response()
            }
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(serde_json::json!({"detail": "Internal server error"})))
                    .into_response()
            }
        }
    }
}
