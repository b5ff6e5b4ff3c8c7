use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokenward_core::error::CoreError;

/// The single message returned for every rejected credential.
///
/// Callers cannot tell an unknown session from a wrong secret, a revoked
/// session, an expired one, or a lost race.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or expired credentials";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for protocol errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A protocol-level error from `tokenward_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::BadRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
                CoreError::Unauthorized(reason) => {
                    tracing::debug!(reason = %reason, "Credential rejected");
                    unauthorized()
                }
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id = %id, "Credential references unknown entity");
                    unauthorized()
                }
                CoreError::IssuanceFailed(msg) => {
                    tracing::error!(error = %msg, "Token issuance failed");
                    internal()
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn unauthorized() -> (StatusCode, &'static str, String) {
    (
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
        UNAUTHORIZED_MESSAGE.to_string(),
    )
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
