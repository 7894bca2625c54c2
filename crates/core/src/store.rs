//! Persistence boundaries used by the coordinator.
//!
//! Each call is assumed atomic and strongly consistent on its own store. No
//! transaction spans the two stores.

use async_trait::async_trait;

use crate::account::{Account, NewAccount};
use crate::error::StoreError;
use crate::session::{NewSession, Session, SessionWithAccount};
use crate::types::DbId;

/// Account persistence. E-mail uniqueness must be enforced by the store
/// itself; a duplicate insert reports [`StoreError::UniqueViolation`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, input: &NewAccount) -> Result<Account, StoreError>;

    /// Set the activation flag. Returns `false` if no account has this id.
    async fn update_activation_flag(&self, id: DbId, complete: bool) -> Result<bool, StoreError>;
}

/// Session persistence, keyed by the SHA-256 digests of the access and
/// refresh tokens. Stores never see a usable bearer token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_by_access_token_hash(&self, hash: &str) -> Result<Option<Session>, StoreError>;

    /// Look up a session by refresh token digest with its owning account resolved.
    async fn find_by_refresh_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<SessionWithAccount>, StoreError>;

    async fn insert(&self, input: &NewSession) -> Result<Session, StoreError>;

    /// Replace the access token digest in place. Returns `false` if the row is gone.
    async fn update_access_token_hash(&self, id: DbId, hash: &str) -> Result<bool, StoreError>;

    /// Remove a session. Returns `false` if the row was already gone.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;
}
