pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                         service health
///
/// /auth
///     POST /sign-up               register, mail activation link
///     GET  /confirm/{id}          activate, redirect to front end
///     POST /sign-in               credentials -> token pair
///     GET  /sign-out              revoke session (bearer access token)
///     GET  /refresh-token         rotate access token (bearer refresh token)
///     GET  /me                    current account (bearer access token)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
}
