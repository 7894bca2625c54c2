//! Flow-level tests for `AuthCoordinator` against the in-memory stores.
//!
//! Covers registration uniqueness, the activation gate, credential checks,
//! token rotation and fingerprint-bound sign-out.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Duration;
use maxpizza_core::account::{Account, NewAccount};
use maxpizza_core::config::AuthConfig;
use maxpizza_core::fingerprint::Fingerprint;
use maxpizza_core::memory::{MemoryAccountStore, MemorySessionStore, RecordingNotifier};
use maxpizza_core::session::{NewSession, Session, SessionWithAccount};
use maxpizza_core::store::{AccountStore, SessionStore};
use maxpizza_core::token::hash_token;
use maxpizza_core::types::DbId;
use maxpizza_core::validation::{SignInInput, SignUpInput};
use maxpizza_core::{AuthCoordinator, AuthError, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        access_token_ttl: Duration::hours(2),
        refresh_token_ttl: None,
        hash_cost: 1,
        public_host: "api.test".into(),
        public_port: 8080,
    }
}

struct Harness {
    auth: AuthCoordinator,
    accounts: Arc<MemoryAccountStore>,
    sessions: Arc<MemorySessionStore>,
    notifier: Arc<RecordingNotifier>,
}

fn harness_with(notifier: RecordingNotifier) -> Harness {
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new(Arc::clone(&accounts)));
    let notifier = Arc::new(notifier);
    let auth = AuthCoordinator::new(
        test_config(),
        accounts.clone(),
        sessions.clone(),
        notifier.clone(),
    )
    .expect("test config is valid");
    Harness {
        auth,
        accounts,
        sessions,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(RecordingNotifier::new())
}

fn sign_up(email: &str, password: &str) -> SignUpInput {
    SignUpInput {
        email: email.into(),
        password: password.into(),
        first_name: "A".into(),
        last_name: "B".into(),
    }
}

fn sign_in(email: &str, password: &str) -> SignInInput {
    SignInInput {
        email: email.into(),
        password: password.into(),
    }
}

fn fingerprint(id: &str) -> Fingerprint {
    Fingerprint {
        id: id.into(),
        user_agent: Some("Mozilla/5.0".into()),
        accept_language: Some("en".into()),
        ip_address: Some("10.0.0.1".into()),
    }
}

/// Register and activate an account, returning it.
async fn active_account(h: &Harness, email: &str, password: &str) -> Account {
    let account = h.auth.register(&sign_up(email, password)).await.unwrap();
    h.auth.activate(account.id).await.unwrap();
    account
}

// ---------------------------------------------------------------------------
// Register / Activate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_persists_pending_account_and_sends_link() {
    let h = harness();
    let account = h.auth.register(&sign_up("a@x.com", "pw")).await.unwrap();

    assert!(!account.is_registration_complete);
    assert_ne!(account.password_hash, "pw");
    assert!(account.password_hash.starts_with("$argon2id$"));

    let sent = h.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "a@x.com");
    assert_eq!(
        sent[0].activation_url,
        format!("http://api.test:8080/auth/confirm/{}", account.id)
    );
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let h = harness();
    h.auth.register(&sign_up("a@x.com", "pw")).await.unwrap();

    let mut second = sign_up("a@x.com", "pw2");
    second.first_name = "Other".into();
    let err = h.auth.register(&second).await.unwrap_err();

    assert_matches!(err, AuthError::DuplicateAccount);
    assert_eq!(h.accounts.count().await, 1);
    assert_eq!(h.notifier.sent().await.len(), 1, "no second activation mail");
}

/// Store that never finds an account by e-mail, simulating a concurrent
/// registration that passed the pre-check.
struct RacingAccounts(Arc<MemoryAccountStore>);

#[async_trait]
impl AccountStore for RacingAccounts {
    async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StoreError> {
        Ok(None)
    }
    async fn find_by_id(&self, id: DbId) -> Result<Option<Account>, StoreError> {
        self.0.find_by_id(id).await
    }
    async fn insert(&self, input: &NewAccount) -> Result<Account, StoreError> {
        self.0.insert(input).await
    }
    async fn update_activation_flag(&self, id: DbId, complete: bool) -> Result<bool, StoreError> {
        self.0.update_activation_flag(id, complete).await
    }
}

#[tokio::test]
async fn losing_a_registration_race_is_a_duplicate() {
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new(Arc::clone(&accounts)));
    let auth = AuthCoordinator::new(
        test_config(),
        Arc::new(RacingAccounts(Arc::clone(&accounts))),
        sessions,
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();

    auth.register(&sign_up("a@x.com", "pw")).await.unwrap();
    let err = auth.register(&sign_up("a@x.com", "pw")).await.unwrap_err();

    assert_matches!(err, AuthError::DuplicateAccount);
    assert_eq!(accounts.count().await, 1);
}

#[tokio::test]
async fn failed_notification_keeps_the_account() {
    let h = harness_with(RecordingNotifier::failing("smtp down"));
    let err = h.auth.register(&sign_up("a@x.com", "pw")).await.unwrap_err();

    assert_matches!(err, AuthError::NotificationDeliveryFailed(msg) if msg.contains("smtp down"));
    let stored = h.accounts.find_by_email("a@x.com").await.unwrap();
    assert!(stored.is_some(), "account is committed before notification");
}

#[tokio::test]
async fn activate_is_idempotent() {
    let h = harness();
    let account = h.auth.register(&sign_up("a@x.com", "pw")).await.unwrap();

    h.auth.activate(account.id).await.unwrap();
    h.auth.activate(account.id).await.unwrap();

    let stored = h.accounts.find_by_id(account.id).await.unwrap().unwrap();
    assert!(stored.is_registration_complete);
}

#[tokio::test]
async fn activate_unknown_account_is_not_found() {
    let h = harness();
    let err = h.auth.activate(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, AuthError::AccountNotFound);
}

// ---------------------------------------------------------------------------
// Authenticate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_before_activation_is_gated() {
    let h = harness();
    h.auth.register(&sign_up("a@x.com", "pw")).await.unwrap();

    // Correct password, still refused.
    let err = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap_err();
    assert_matches!(err, AuthError::ActivationRequired);
    assert_eq!(h.sessions.count().await, 0);
}

#[tokio::test]
async fn authenticate_unknown_email_is_not_found() {
    let h = harness();
    let err = h
        .auth
        .authenticate(&sign_in("ghost@x.com", "pw"), None)
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::AccountNotFound);
}

#[tokio::test]
async fn wrong_password_creates_no_session() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;

    let err = h
        .auth
        .authenticate(&sign_in("a@x.com", "wrong"), None)
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::InvalidCredentials);
    assert_eq!(h.sessions.count().await, 0);
}

#[tokio::test]
async fn authenticate_issues_pair_and_one_session() {
    let h = harness();
    let account = active_account(&h, "a@x.com", "pw").await;

    let pair = h
        .auth
        .authenticate(&sign_in("a@x.com", "pw"), Some(&fingerprint("f1")))
        .await
        .unwrap();

    assert_ne!(pair.access_token, pair.refresh_token);
    assert_eq!(h.sessions.count().await, 1);

    let claims = h.auth.tokens().verify_access(&pair.access_token).unwrap();
    assert_eq!(claims.sub, account.id);
    assert_eq!(claims.exp, Some(claims.iat + 2 * 60 * 60));

    let session = h
        .sessions
        .find_by_access_token_hash(&hash_token(&pair.access_token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.account_id, account.id);
    assert_eq!(session.refresh_token_hash, hash_token(&pair.refresh_token));
    assert!(session.fingerprint.unwrap().contains("\"id\":\"f1\""));
}

#[tokio::test]
async fn authenticate_without_fingerprint_stores_none() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;

    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();
    let session = h
        .sessions
        .find_by_access_token_hash(&hash_token(&pair.access_token))
        .await
        .unwrap()
        .unwrap();
    assert!(session.fingerprint.is_none());
}

#[tokio::test]
async fn sessions_persist_only_token_digests() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    let session = h
        .sessions
        .find_by_access_token_hash(&hash_token(&pair.access_token))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(session.access_token_hash, pair.access_token);
    assert_ne!(session.refresh_token_hash, pair.refresh_token);
    assert!(h
        .sessions
        .find_by_access_token_hash(&pair.access_token)
        .await
        .unwrap()
        .is_none());

    // A leaked digest is not a usable credential.
    let err = h
        .auth
        .rotate(&format!("Bearer {}", session.refresh_token_hash))
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
    let err = h
        .auth
        .deauthenticate(&format!("Bearer {}", session.access_token_hash), None)
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

#[tokio::test]
async fn each_authentication_opens_its_own_session() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;

    let first = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();
    let second = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(h.sessions.count().await, 2);
}

// ---------------------------------------------------------------------------
// Rotate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rotate_replaces_access_token_and_keeps_refresh_token() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();
    let bearer = format!("Bearer {}", pair.refresh_token);

    let rotated = h.auth.rotate(&bearer).await.unwrap();
    assert_ne!(rotated, pair.access_token);

    // Same row, new access token.
    assert_eq!(h.sessions.count().await, 1);
    let found = h
        .sessions
        .find_by_refresh_token_hash(&hash_token(&pair.refresh_token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.session.access_token_hash, hash_token(&rotated));
    assert!(h
        .sessions
        .find_by_access_token_hash(&hash_token(&pair.access_token))
        .await
        .unwrap()
        .is_none());

    // The refresh token survives use.
    let again = h.auth.rotate(&bearer).await.unwrap();
    assert_ne!(again, rotated);
}

#[tokio::test]
async fn rotate_unknown_refresh_token_is_session_not_found() {
    let h = harness();
    let err = h.auth.rotate("Bearer not-a-token").await.unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

#[tokio::test]
async fn access_token_cannot_be_used_to_rotate() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    let err = h
        .auth
        .rotate(&format!("Bearer {}", pair.access_token))
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

// ---------------------------------------------------------------------------
// Deauthenticate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deauthenticate_with_matching_fingerprint_removes_session() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let f1 = fingerprint("f1");
    let pair = h
        .auth
        .authenticate(&sign_in("a@x.com", "pw"), Some(&f1))
        .await
        .unwrap();

    h.auth
        .deauthenticate(&format!("Bearer {}", pair.access_token), Some(&f1))
        .await
        .unwrap();

    assert_eq!(h.sessions.count().await, 0);
    let err = h.auth.rotate(&format!("Bearer {}", pair.refresh_token)).await.unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

#[tokio::test]
async fn deauthenticate_with_other_fingerprint_keeps_session() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h
        .auth
        .authenticate(&sign_in("a@x.com", "pw"), Some(&fingerprint("f1")))
        .await
        .unwrap();

    let err = h
        .auth
        .deauthenticate(&format!("Bearer {}", pair.access_token), Some(&fingerprint("f2")))
        .await
        .unwrap_err();

    assert_matches!(err, AuthError::FingerprintMismatch);
    assert!(h
        .sessions
        .find_by_access_token_hash(&hash_token(&pair.access_token))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn fingerprint_comparison_ignores_non_identity_fields() {
    // Identity-only equality is deliberate: a changed user agent with the
    // same fingerprint id still counts as the same client.
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h
        .auth
        .authenticate(&sign_in("a@x.com", "pw"), Some(&fingerprint("f1")))
        .await
        .unwrap();

    let mut presented = fingerprint("f1");
    presented.user_agent = Some("curl/8.0".into());
    presented.ip_address = Some("192.168.1.9".into());

    h.auth
        .deauthenticate(&format!("Bearer {}", pair.access_token), Some(&presented))
        .await
        .unwrap();
    assert_eq!(h.sessions.count().await, 0);
}

#[tokio::test]
async fn deauthenticate_unknown_token_is_session_not_found() {
    let h = harness();
    let err = h
        .auth
        .deauthenticate("Bearer missing", Some(&fingerprint("f1")))
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

/// Store whose delete always reports that another request removed the row
/// first.
struct RacingSessions(Arc<MemorySessionStore>);

#[async_trait]
impl SessionStore for RacingSessions {
    async fn find_by_access_token_hash(&self, hash: &str) -> Result<Option<Session>, StoreError> {
        self.0.find_by_access_token_hash(hash).await
    }
    async fn find_by_refresh_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<SessionWithAccount>, StoreError> {
        self.0.find_by_refresh_token_hash(hash).await
    }
    async fn insert(&self, input: &NewSession) -> Result<Session, StoreError> {
        self.0.insert(input).await
    }
    async fn update_access_token_hash(&self, id: DbId, hash: &str) -> Result<bool, StoreError> {
        self.0.update_access_token_hash(id, hash).await
    }
    async fn delete(&self, _id: DbId) -> Result<bool, StoreError> {
        Ok(false)
    }
}

#[tokio::test]
async fn losing_a_sign_out_race_is_session_not_found() {
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new(Arc::clone(&accounts)));
    let auth = AuthCoordinator::new(
        test_config(),
        accounts.clone(),
        Arc::new(RacingSessions(Arc::clone(&sessions))),
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();

    let account = auth.register(&sign_up("a@x.com", "pw")).await.unwrap();
    auth.activate(account.id).await.unwrap();
    let pair = auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    let err = auth
        .deauthenticate(&format!("Bearer {}", pair.access_token), None)
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

// ---------------------------------------------------------------------------
// Current account
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_account_follows_the_live_access_token() {
    let h = harness();
    let account = active_account(&h, "a@x.com", "pw").await;
    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    let me = h
        .auth
        .current_account(&format!("Bearer {}", pair.access_token))
        .await
        .unwrap();
    assert_eq!(me.id, account.id);

    // After rotation the old access token no longer resolves.
    h.auth.rotate(&format!("Bearer {}", pair.refresh_token)).await.unwrap();
    let err = h
        .auth
        .current_account(&format!("Bearer {}", pair.access_token))
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::SessionNotFound);
}

#[tokio::test]
async fn current_account_rejects_refresh_tokens() {
    let h = harness();
    active_account(&h, "a@x.com", "pw").await;
    let pair = h.auth.authenticate(&sign_in("a@x.com", "pw"), None).await.unwrap();

    let err = h
        .auth
        .current_account(&format!("Bearer {}", pair.refresh_token))
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::InvalidToken);
}

#[test]
fn coordinator_refuses_shared_secrets() {
    let mut config = test_config();
    config.refresh_token_secret = config.access_token_secret.clone();
    let accounts = Arc::new(MemoryAccountStore::new());
    let result = AuthCoordinator::new(
        config,
        accounts.clone(),
        Arc::new(MemorySessionStore::new(accounts)),
        Arc::new(RecordingNotifier::new()),
    );
    assert!(matches!(result, Err(AuthError::Config(_))));
}
