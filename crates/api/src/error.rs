use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maxpizza_core::validation::ValidationReport;
use maxpizza_core::AuthError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AuthError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `maxpizza_core`.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request input failed declarative validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationReport> for AppError {
    fn from(report: ValidationReport) -> Self {
        AppError::Validation(report)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Auth(err) => classify_auth_error(err),
            AppError::Validation(report) => {
                let body = json!({
                    "error": report.to_string(),
                    "code": "VALIDATION_ERROR",
                    "fields": report.fields,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
///
/// Client-caused failures keep their message; server faults are logged in
/// full and answered with a sanitized 500 (or 502 for mail delivery).
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::DuplicateAccount => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        AuthError::AccountNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        AuthError::ActivationRequired => {
            (StatusCode::FORBIDDEN, "ACTIVATION_REQUIRED", err.to_string())
        }
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", err.to_string())
        }
        AuthError::SessionNotFound => {
            (StatusCode::UNAUTHORIZED, "SESSION_NOT_FOUND", err.to_string())
        }
        AuthError::FingerprintMismatch => {
            (StatusCode::UNAUTHORIZED, "FINGERPRINT_MISMATCH", err.to_string())
        }
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", err.to_string()),
        AuthError::NotificationDeliveryFailed(reason) => {
            tracing::error!(error = %reason, "Activation mail delivery failed");
            (
                StatusCode::BAD_GATEWAY,
                "NOTIFICATION_FAILED",
                "The account was created but the activation e-mail could not be sent".to_string(),
            )
        }
        AuthError::InternalCryptoError(_) | AuthError::Store(_) | AuthError::Config(_) => {
            tracing::error!(error = %err, "Internal auth error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
