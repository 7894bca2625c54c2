//! Repository for the `sessions` table.

use maxpizza_core::session::NewSession;
use maxpizza_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::{SessionAccountRow, SessionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, account_id, access_token_hash, refresh_token_hash, fingerprint, \
                        created_at, updated_at";

/// Session columns plus the owning account's, for `sessions s JOIN accounts a`.
const JOINED_COLUMNS: &str = "s.id, s.account_id, s.access_token_hash, s.refresh_token_hash, \
                               s.fingerprint, s.created_at, s.updated_at, \
                               a.email AS account_email, \
                               a.first_name AS account_first_name, \
                               a.last_name AS account_last_name, \
                               a.password_hash AS account_password_hash, \
                               a.is_registration_complete AS account_is_registration_complete, \
                               a.created_at AS account_created_at, \
                               a.updated_at AS account_updated_at";

/// Provides lookups and writes for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (id, account_id, access_token_hash, refresh_token_hash, fingerprint)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(Uuid::new_v4())
            .bind(input.account_id)
            .bind(&input.access_token_hash)
            .bind(&input.refresh_token_hash)
            .bind(&input.fingerprint)
            .fetch_one(pool)
            .await
    }

    /// Find the session whose current access token hashes to `token_hash`.
    pub async fn find_by_access_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE access_token_hash = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Find the session whose refresh token hashes to `token_hash`, together
    /// with its account.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<SessionAccountRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM sessions s
             JOIN accounts a ON a.id = s.account_id
             WHERE s.refresh_token_hash = $1"
        );
        sqlx::query_as::<_, SessionAccountRow>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace the access token hash in place. Returns `true` if the row was updated.
    pub async fn update_access_token_hash(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET access_token_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
