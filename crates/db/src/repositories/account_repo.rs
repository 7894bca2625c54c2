//! Repository for the `accounts` table.

use maxpizza_core::account::NewAccount;
use maxpizza_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::AccountRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, first_name, last_name, password_hash, \
                        is_registration_complete, created_at, updated_at";

/// Provides lookups and writes for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account pending activation, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAccount) -> Result<AccountRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (id, email, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Set the activation flag. Returns `true` if a row with `id` exists.
    pub async fn set_registration_complete(
        pool: &PgPool,
        id: DbId,
        complete: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET is_registration_complete = $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(complete)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
