//! Registration, activation, authentication and session lifecycle.
//!
//! [`AuthCoordinator`] drives every auth flow against the store and notifier
//! traits. It keeps no mutable state of its own: each flow performs at most
//! one read and one write per store and holds no lock across a store call.
//!
//! ```text
//! Account:  Unregistered -> PendingActivation -> Active
//! Session:  (none) -> Issued -> Rotated* -> Revoked
//! ```

use std::sync::Arc;

use crate::account::{Account, NewAccount};
use crate::config::AuthConfig;
use crate::error::{AuthError, StoreError};
use crate::fingerprint::{self, Fingerprint};
use crate::notifier::{ActivationNotice, Notifier};
use crate::password;
use crate::session::NewSession;
use crate::store::{AccountStore, SessionStore};
use crate::token::{hash_token, TokenIssuer, TokenPair};
use crate::types::DbId;
use crate::validation::{SignInInput, SignUpInput};

/// Remove the `Bearer ` scheme from an `Authorization` header value.
///
/// A value without the scheme is returned trimmed and otherwise unchanged.
pub fn strip_bearer(authorization: &str) -> &str {
    let value = authorization.trim();
    value.strip_prefix("Bearer ").unwrap_or(value).trim()
}

/// Orchestrates the auth flows over the persistence and notification seams.
pub struct AuthCoordinator {
    config: AuthConfig,
    tokens: TokenIssuer,
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl AuthCoordinator {
    /// Build a coordinator. Fails fast if `config` is unusable.
    pub fn new(
        config: AuthConfig,
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenIssuer::new(&config)?;
        Ok(Self {
            config,
            tokens,
            accounts,
            sessions,
            notifier,
        })
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // -----------------------------------------------------------------------
    // Register / Activate
    // -----------------------------------------------------------------------

    /// Create an account pending activation and send its activation link.
    ///
    /// The account is committed before the notification is attempted. A
    /// delivery failure is reported as [`AuthError::NotificationDeliveryFailed`]
    /// and the account is kept.
    pub async fn register(&self, input: &SignUpInput) -> Result<Account, AuthError> {
        if self.accounts.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = self.hash_password(&input.password).await?;

        let new_account = NewAccount {
            email: input.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            password_hash,
        };
        let account = self
            .accounts
            .insert(&new_account)
            .await
            .map_err(|e| match e {
                // Lost a registration race: the store's unique constraint is the real guard.
                StoreError::UniqueViolation { .. } => AuthError::DuplicateAccount,
                other => AuthError::Store(other),
            })?;
        tracing::info!(account_id = %account.id, "Account registered, pending activation");

        let notice = ActivationNotice {
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            activation_url: self.config.activation_url(account.id),
        };
        if let Err(e) = self.notifier.send_activation(&notice).await {
            tracing::error!(
                account_id = %account.id,
                error = %e,
                "Activation notification failed; account remains pending"
            );
            return Err(AuthError::NotificationDeliveryFailed(e.to_string()));
        }

        Ok(account)
    }

    /// Mark an account as activated. Activating twice is a no-op.
    pub async fn activate(&self, account_id: DbId) -> Result<(), AuthError> {
        if !self
            .accounts
            .update_activation_flag(account_id, true)
            .await?
        {
            return Err(AuthError::AccountNotFound);
        }
        tracing::info!(account_id = %account_id, "Account activated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Authenticate / Deauthenticate
    // -----------------------------------------------------------------------

    /// Check credentials and open a session bound to `fingerprint`.
    ///
    /// An absent fingerprint is accepted and stored as absent.
    pub async fn authenticate(
        &self,
        input: &SignInInput,
        fingerprint: Option<&Fingerprint>,
    ) -> Result<TokenPair, AuthError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !account.is_registration_complete {
            return Err(AuthError::ActivationRequired);
        }

        if !self
            .verify_password(&input.password, &account.password_hash)
            .await?
        {
            tracing::info!(account_id = %account.id, "Rejected sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(account.id)?;
        let refresh_token = self.tokens.issue_refresh(account.id)?;

        let session = self
            .sessions
            .insert(&NewSession {
                account_id: account.id,
                access_token_hash: hash_token(&access_token),
                refresh_token_hash: hash_token(&refresh_token),
                fingerprint: fingerprint::serialize(fingerprint)?,
            })
            .await?;
        tracing::info!(
            account_id = %account.id,
            session_id = %session.id,
            fingerprinted = fingerprint.is_some(),
            "Session issued"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Close the session identified by a bearer access token.
    ///
    /// The session is only removed when the presented fingerprint has the
    /// same identity as the one stored at authentication time.
    pub async fn deauthenticate(
        &self,
        authorization: &str,
        fingerprint: Option<&Fingerprint>,
    ) -> Result<(), AuthError> {
        let access_token = strip_bearer(authorization);

        let session = self
            .sessions
            .find_by_access_token_hash(&hash_token(access_token))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !fingerprint::identity_matches(session.fingerprint.as_deref(), fingerprint) {
            tracing::warn!(
                session_id = %session.id,
                account_id = %session.account_id,
                "Sign-out fingerprint does not match session; keeping session"
            );
            return Err(AuthError::FingerprintMismatch);
        }

        if !self.sessions.delete(session.id).await? {
            tracing::debug!(session_id = %session.id, "Session removed concurrently");
            return Err(AuthError::SessionNotFound);
        }
        tracing::info!(session_id = %session.id, account_id = %session.account_id, "Session revoked");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rotate
    // -----------------------------------------------------------------------

    /// Mint a new access token for the session holding a bearer refresh token.
    ///
    /// The access token is replaced in place; the refresh token is kept and
    /// stays usable for later rotations.
    pub async fn rotate(&self, authorization: &str) -> Result<String, AuthError> {
        let refresh_token = strip_bearer(authorization);

        let found = self
            .sessions
            .find_by_refresh_token_hash(&hash_token(refresh_token))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        // Only rejects when a refresh lifetime is configured and has passed.
        self.tokens.verify_refresh(refresh_token)?;

        let access_token = self.tokens.issue_access(found.account.id)?;
        if !self
            .sessions
            .update_access_token_hash(found.session.id, &hash_token(&access_token))
            .await?
        {
            return Err(AuthError::SessionNotFound);
        }
        tracing::info!(
            session_id = %found.session.id,
            account_id = %found.account.id,
            "Access token rotated"
        );

        Ok(access_token)
    }

    // -----------------------------------------------------------------------
    // Current account
    // -----------------------------------------------------------------------

    /// Resolve the account behind a bearer access token.
    ///
    /// The token must verify and still be the current access token of a live
    /// session, so revoked and rotated-out tokens are refused.
    pub async fn current_account(&self, authorization: &str) -> Result<Account, AuthError> {
        let access_token = strip_bearer(authorization);
        let claims = self.tokens.verify_access(access_token)?;

        self.sessions
            .find_by_access_token_hash(&hash_token(access_token))
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        self.accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Hash on the blocking pool so request handling threads stay free.
    async fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let cost = self.config.hash_cost;
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = password::gen_salt(cost)?;
            password::hash_password(&plaintext, &salt)
        })
        .await
        .map_err(|e| AuthError::InternalCryptoError(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &digest))
            .await
            .map_err(|e| AuthError::InternalCryptoError(format!("verification task failed: {e}")))?
    }
}
