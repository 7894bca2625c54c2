//! Authentication settings threaded through construction.
//!
//! Nothing in this crate reads the process environment; the binary builds an
//! [`AuthConfig`] once at startup and hands it to the services that need it.

use chrono::Duration;

use crate::error::AuthError;

/// Default access token lifetime (2 hours).
pub const DEFAULT_ACCESS_TOKEN_TTL_MINS: i64 = 120;

/// Default password hashing cost factor (Argon2 iterations).
pub const DEFAULT_HASH_COST: u32 = 3;

/// Secrets, hashing cost and public addressing used by the auth flows.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: String,
    /// Lifetime of an access token.
    pub access_token_ttl: Duration,
    /// Lifetime of a refresh token. `None` means refresh tokens carry no
    /// expiry claim and stay valid for as long as their session row exists.
    pub refresh_token_ttl: Option<Duration>,
    /// Cost factor handed to [`gen_salt`](crate::password::gen_salt).
    pub hash_cost: u32,
    /// Public host embedded in activation links.
    pub public_host: String,
    /// Public port embedded in activation links.
    pub public_port: u16,
}

impl AuthConfig {
    /// Reject configurations that would produce insecure or unusable tokens.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_secret.is_empty() {
            return Err(AuthError::Config(
                "access token secret must not be empty".into(),
            ));
        }
        if self.refresh_token_secret.is_empty() {
            return Err(AuthError::Config(
                "refresh token secret must not be empty".into(),
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AuthError::Config(
                "access and refresh token secrets must differ".into(),
            ));
        }
        if self.hash_cost == 0 {
            return Err(AuthError::Config(
                "password hash cost factor must be positive".into(),
            ));
        }
        if self.access_token_ttl <= Duration::zero() {
            return Err(AuthError::Config(
                "access token lifetime must be positive".into(),
            ));
        }
        if let Some(ttl) = self.refresh_token_ttl {
            if ttl <= Duration::zero() {
                return Err(AuthError::Config(
                    "refresh token lifetime must be positive when set".into(),
                ));
            }
        }
        Ok(())
    }

    /// Link that marks the account as activated when followed.
    pub fn activation_url(&self, account_id: crate::types::DbId) -> String {
        format!(
            "http://{}:{}/auth/confirm/{}",
            self.public_host, self.public_port, account_id
        )
    }
}
