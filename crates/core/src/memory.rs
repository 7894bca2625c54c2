//! In-memory store and notifier implementations.
//!
//! Used by tests and local tooling in place of PostgreSQL and SMTP. They
//! honour the same contracts as the production implementations, including the
//! unique constraint on account e-mail.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::account::{Account, NewAccount};
use crate::error::StoreError;
use crate::notifier::{ActivationNotice, Notifier, NotifyError};
use crate::session::{NewSession, Session, SessionWithAccount};
use crate::store::{AccountStore, SessionStore};
use crate::types::DbId;

/// Constraint name reported when a second account reuses an e-mail.
pub const UQ_ACCOUNTS_EMAIL: &str = "uq_accounts_email";

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    rows: RwLock<HashMap<DbId, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Account>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, input: &NewAccount) -> Result<Account, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|a| a.email == input.email) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_ACCOUNTS_EMAIL.to_string(),
            });
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            password_hash: input.password_hash.clone(),
            is_registration_complete: false,
            created_at: now,
            updated_at: now,
        };
        rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_activation_flag(&self, id: DbId, complete: bool) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(account) => {
                account.is_registration_complete = complete;
                account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Sessions resolve their owning account through the shared account store.
#[derive(Debug)]
pub struct MemorySessionStore {
    accounts: Arc<MemoryAccountStore>,
    rows: RwLock<HashMap<DbId, Session>>,
}

impl MemorySessionStore {
    pub fn new(accounts: Arc<MemoryAccountStore>) -> Self {
        Self {
            accounts,
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_access_token_hash(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|s| s.access_token_hash == hash).cloned())
    }

    async fn find_by_refresh_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<SessionWithAccount>, StoreError> {
        let session = {
            let rows = self.rows.read().await;
            rows.values().find(|s| s.refresh_token_hash == hash).cloned()
        };
        let Some(session) = session else {
            return Ok(None);
        };

        let account = self
            .accounts
            .find_by_id(session.account_id)
            .await?
            .ok_or_else(|| {
                StoreError::Backend(format!(
                    "session {} references missing account {}",
                    session.id, session.account_id
                ))
            })?;
        Ok(Some(SessionWithAccount { session, account }))
    }

    async fn insert(&self, input: &NewSession) -> Result<Session, StoreError> {
        if self.accounts.find_by_id(input.account_id).await?.is_none() {
            return Err(StoreError::Backend(format!(
                "account {} does not exist",
                input.account_id
            )));
        }

        let mut rows = self.rows.write().await;
        if rows.values().any(|s| {
            s.access_token_hash == input.access_token_hash
                || s.refresh_token_hash == input.refresh_token_hash
        }) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_sessions_tokens".to_string(),
            });
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            account_id: input.account_id,
            access_token_hash: input.access_token_hash.clone(),
            refresh_token_hash: input.refresh_token_hash.clone(),
            fingerprint: input.fingerprint.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_access_token_hash(&self, id: DbId, hash: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(session) => {
                session.access_token_hash = hash.to_string();
                session.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

/// Notifier that records every notice instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RwLock<Vec<ActivationNotice>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    pub async fn sent(&self) -> Vec<ActivationNotice> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        if let Some(reason) = &self.fail_with {
            return Err(NotifyError(reason.clone()));
        }
        self.sent.write().await.push(notice.clone());
        Ok(())
    }
}
