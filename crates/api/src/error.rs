use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tunedrop_core::error::{CoreError, SubmitError, ValidationIssue};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`SubmitError`] for submission
/// outcomes, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tunedrop_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rejected submission.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Field-level validation failures outside of submission (e.g. rejected files).
    #[error("Validation failed with {} issue(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),

    /// A collaborator (store, storage) failed while serving the request.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn invalid(issues: &[ValidationIssue]) -> (StatusCode, &'static str, String) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        "VALIDATION_ERROR",
        format!("{} field(s) need attention", issues.len()),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Submission outcomes ---
            AppError::Submit(err) => match err {
                SubmitError::Invalid(issues) => invalid(issues),
                SubmitError::InProgress => {
                    (StatusCode::CONFLICT, "SUBMISSION_IN_PROGRESS", err.to_string())
                }
                SubmitError::AlreadyComplete => {
                    (StatusCode::CONFLICT, "ALREADY_SUBMITTED", err.to_string())
                }
                SubmitError::NotStarted => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
                SubmitError::Persistence(e) => {
                    tracing::warn!(error = %e, "Submission rejected by the store");
                    (StatusCode::BAD_GATEWAY, "PERSISTENCE_ERROR", err.to_string())
                }
            },

            // --- HTTP-specific errors ---
            AppError::Invalid(issues) => invalid(issues),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream collaborator failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        let issues = match &self {
            AppError::Submit(err) => err.issues(),
            AppError::Invalid(issues) => issues.as_slice(),
            _ => &[],
        };
        if !issues.is_empty() {
            body["issues"] = json!(issues);
        }

        (status, axum::Json(body)).into_response()
    }
}
