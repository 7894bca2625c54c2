//! Bearer token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;

/// The raw token from an `Authorization: Bearer <token>` header.
///
/// Only the header shape is checked here; whether the token is a live access
/// or refresh token is decided by the auth flow that consumes it.
///
/// ```ignore
/// async fn my_handler(BearerToken(token): BearerToken) -> AppResult<()> {
///     tracing::debug!("handling request with a bearer token");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                )
            })?;

        Ok(BearerToken(token.to_string()))
    }
}
