//! Session entity and DTOs.

use crate::account::Account;
use crate::types::{DbId, Timestamp};

/// A persisted binding between an account, its current tokens and the
/// fingerprint of the client that authenticated.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: DbId,
    pub account_id: DbId,
    /// Digest of the current access token; replaced in place on rotation.
    pub access_token_hash: String,
    /// Digest of the refresh token; unchanged for the life of the session.
    pub refresh_token_hash: String,
    /// Serialized [`Fingerprint`](crate::fingerprint::Fingerprint), if one was presented.
    pub fingerprint: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new session. Tokens arrive already hashed with
/// [`hash_token`](crate::token::hash_token).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub account_id: DbId,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub fingerprint: Option<String>,
}

/// A session together with the account that owns it.
#[derive(Debug, Clone)]
pub struct SessionWithAccount {
    pub session: Session,
    pub account: Account,
}
