//! Handlers for the `/auth` resource (sign-up, confirm, sign-in, sign-out,
//! refresh-token, me).

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use maxpizza_core::account::AccountResponse;
use maxpizza_core::token::TokenPair;
use maxpizza_core::types::DbId;
use maxpizza_core::validation::{validate_input, SignInInput, SignUpInput};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::fingerprint::ClientFingerprint;
use crate::middleware::auth::BearerToken;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for `GET /auth/refresh-token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Unwrap a JSON body, turning axum's rejection into the standard error body.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/sign-up
///
/// Register an account pending activation and mail its activation link.
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpInput>, JsonRejection>,
) -> AppResult<StatusCode> {
    let input = json_body(payload)?;
    validate_input(&input)?;

    state.auth.register(&input).await?;
    Ok(StatusCode::CREATED)
}

/// GET /auth/confirm/{id}
///
/// Activate the account and send the browser on to the front end.
pub async fn confirm(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    state.auth.activate(id).await?;

    let location = format!("{}/auth/confirm", state.config.front_host);
    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

/// POST /auth/sign-in
///
/// Check credentials and open a session bound to the caller's fingerprint.
pub async fn sign_in(
    State(state): State<AppState>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    payload: Result<Json<SignInInput>, JsonRejection>,
) -> AppResult<Json<TokenPair>> {
    let input = json_body(payload)?;
    validate_input(&input)?;

    let pair = state.auth.authenticate(&input, Some(&fingerprint)).await?;
    Ok(Json(pair))
}

/// GET /auth/sign-out
///
/// Close the session holding the bearer access token, if the caller's
/// fingerprint matches the one it was opened with.
pub async fn sign_out(
    State(state): State<AppState>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    BearerToken(token): BearerToken,
) -> AppResult<StatusCode> {
    state.auth.deauthenticate(&token, Some(&fingerprint)).await?;
    Ok(StatusCode::OK)
}

/// GET /auth/refresh-token
///
/// Mint a new access token for the session holding the bearer refresh token.
pub async fn refresh_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<RefreshResponse>> {
    let access_token = state.auth.rotate(&token).await?;
    Ok(Json(RefreshResponse { access_token }))
}

/// GET /auth/me
///
/// Return the account behind a live bearer access token.
pub async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<AccountResponse>> {
    let account = state.auth.current_account(&token).await?;
    Ok(Json(AccountResponse::from(&account)))
}
