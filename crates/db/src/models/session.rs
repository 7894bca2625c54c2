//! Session rows, plain and joined with the owning account.

use maxpizza_core::account::Account;
use maxpizza_core::session::{Session, SessionWithAccount};
use maxpizza_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: DbId,
    pub account_id: DbId,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub fingerprint: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            access_token_hash: row.access_token_hash,
            refresh_token_hash: row.refresh_token_hash,
            fingerprint: row.fingerprint,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A session row joined with its account. Account columns are prefixed
/// with `account_` to keep names unique.
#[derive(Debug, Clone, FromRow)]
pub struct SessionAccountRow {
    pub id: DbId,
    pub account_id: DbId,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub fingerprint: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub account_email: String,
    pub account_first_name: String,
    pub account_last_name: String,
    pub account_password_hash: String,
    pub account_is_registration_complete: bool,
    pub account_created_at: Timestamp,
    pub account_updated_at: Timestamp,
}

impl From<SessionAccountRow> for SessionWithAccount {
    fn from(row: SessionAccountRow) -> Self {
        let account = Account {
            id: row.account_id,
            email: row.account_email,
            first_name: row.account_first_name,
            last_name: row.account_last_name,
            password_hash: row.account_password_hash,
            is_registration_complete: row.account_is_registration_complete,
            created_at: row.account_created_at,
            updated_at: row.account_updated_at,
        };
        let session = Session {
            id: row.id,
            account_id: row.account_id,
            access_token_hash: row.access_token_hash,
            refresh_token_hash: row.refresh_token_hash,
            fingerprint: row.fingerprint,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self { session, account }
    }
}
