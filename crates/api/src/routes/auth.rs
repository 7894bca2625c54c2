//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /sign-up        -> sign_up
/// GET  /confirm/{id}   -> confirm
/// POST /sign-in        -> sign_in
/// GET  /sign-out       -> sign_out (bearer access token)
/// GET  /refresh-token  -> refresh_token (bearer refresh token)
/// GET  /me             -> me (bearer access token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/confirm/{id}", get(auth::confirm))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", get(auth::sign_out))
        .route("/refresh-token", get(auth::refresh_token))
        .route("/me", get(auth::me))
}
