//! PostgreSQL implementations of the core store traits.

use async_trait::async_trait;
use maxpizza_core::account::{Account, NewAccount};
use maxpizza_core::error::StoreError;
use maxpizza_core::session::{NewSession, Session, SessionWithAccount};
use maxpizza_core::store::{AccountStore, SessionStore};
use maxpizza_core::types::DbId;

use crate::repositories::{AccountRepo, SessionRepo};
use crate::DbPool;

/// Translate a driver error into the store's error vocabulary.
///
/// PostgreSQL unique violations (SQLSTATE 23505) keep their constraint name
/// so callers can tell a duplicate apart from an outage.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

/// [`AccountStore`] backed by the `accounts` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        AccountRepo::find_by_email(&self.pool, email)
            .await
            .map(|row| row.map(Account::from))
            .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Account>, StoreError> {
        AccountRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Account::from))
            .map_err(map_sqlx_error)
    }

    async fn insert(&self, input: &NewAccount) -> Result<Account, StoreError> {
        AccountRepo::create(&self.pool, input)
            .await
            .map(Account::from)
            .map_err(map_sqlx_error)
    }

    async fn update_activation_flag(&self, id: DbId, complete: bool) -> Result<bool, StoreError> {
        AccountRepo::set_registration_complete(&self.pool, id, complete)
            .await
            .map_err(map_sqlx_error)
    }
}

/// [`SessionStore`] backed by the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_by_access_token_hash(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        SessionRepo::find_by_access_token_hash(&self.pool, hash)
            .await
            .map(|row| row.map(Session::from))
            .map_err(map_sqlx_error)
    }

    async fn find_by_refresh_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<SessionWithAccount>, StoreError> {
        SessionRepo::find_by_refresh_token_hash(&self.pool, hash)
            .await
            .map(|row| row.map(SessionWithAccount::from))
            .map_err(map_sqlx_error)
    }

    async fn insert(&self, input: &NewSession) -> Result<Session, StoreError> {
        SessionRepo::create(&self.pool, input)
            .await
            .map(Session::from)
            .map_err(map_sqlx_error)
    }

    async fn update_access_token_hash(&self, id: DbId, hash: &str) -> Result<bool, StoreError> {
        SessionRepo::update_access_token_hash(&self.pool, id, hash)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        SessionRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_backend_failures() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
