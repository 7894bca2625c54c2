//! Account entity and DTOs.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A registered account holder.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: DbId,
    /// Unique, immutable after creation.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    /// `false` until the activation link is followed.
    pub is_registration_complete: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe account representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_registration_complete: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            is_registration_complete: account.is_registration_complete,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// DTO for inserting a new account. Registration always starts incomplete.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}
