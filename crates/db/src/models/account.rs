//! Account row.

use maxpizza_core::account::Account;
use maxpizza_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full account row from the `accounts` table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_registration_complete: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_registration_complete: row.is_registration_complete,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
