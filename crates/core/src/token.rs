//! HS256 bearer token signing and verification.
//!
//! Access and refresh tokens are signed with two different secrets so a
//! refresh token can never be presented as an access token. Access tokens
//! always expire; refresh tokens only expire when a refresh lifetime is
//! configured, otherwise their validity is decided by the session row that
//! stores them.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::types::DbId;

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account id.
    pub sub: DbId,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp). Absent on non-expiring tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Unique token id. Keeps two tokens issued in the same second distinct.
    pub jti: String,
}

/// Options accepted by [`sign`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignOptions {
    /// Lifetime of the token; `None` omits the `exp` claim.
    pub expires_in: Option<Duration>,
}

/// The pair handed to a client after a successful authentication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign a token for `account_id` with `secret`.
///
/// An empty secret is a configuration error, never an unsigned token.
pub fn sign(account_id: DbId, secret: &str, options: SignOptions) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Config("token signing secret is empty".into()));
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: account_id,
        iat: now.timestamp(),
        exp: options.expires_in.map(|ttl| (now + ttl).timestamp()),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalCryptoError(format!("token signing failed: {e}")))
}

/// Compute the SHA-256 hex digest of a token.
///
/// Sessions persist only this digest; an incoming bearer token is hashed
/// before it is looked up.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Decode and check a token signed with `secret`.
///
/// `require_exp` makes a missing `exp` claim a failure; a present `exp` is
/// always checked.
fn verify(token: &str, secret: &str, require_exp: bool) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    if require_exp {
        validation.set_required_spec_claims(&["exp"]);
    }
    validation.validate_exp = true;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        AuthError::InvalidToken
    })
}

/// Issues and verifies access/refresh tokens with the configured secrets.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Option<Duration>,
}

impl TokenIssuer {
    /// Build an issuer, failing fast on missing or shared secrets.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self {
            access_secret: config.access_token_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        })
    }

    /// Lifetime of issued access tokens.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue_access(&self, account_id: DbId) -> Result<String, AuthError> {
        sign(
            account_id,
            &self.access_secret,
            SignOptions {
                expires_in: Some(self.access_ttl),
            },
        )
    }

    pub fn issue_refresh(&self, account_id: DbId) -> Result<String, AuthError> {
        sign(
            account_id,
            &self.refresh_secret,
            SignOptions {
                expires_in: self.refresh_ttl,
            },
        )
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        verify(token, &self.access_secret, true)
    }

    /// Verify a refresh token's signature, and its expiry if it carries one.
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError> {
        verify(token, &self.refresh_secret, false)
    }
}
