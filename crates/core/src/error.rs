//! Error taxonomy for the authentication flows.

/// Failure reported by an [`AccountStore`](crate::store::AccountStore) or
/// [`SessionStore`](crate::store::SessionStore) implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. a second account with the
    /// same e-mail inserted by a concurrent request).
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Any other backend failure (connection, query, decoding).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors produced by [`AuthCoordinator`](crate::coordinator::AuthCoordinator)
/// and the crypto/token services it drives.
///
/// Every variant is terminal for the request that produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this e-mail is already registered")]
    DuplicateAccount,

    #[error("The account does not exist")]
    AccountNotFound,

    #[error("Account registration is not completed")]
    ActivationRequired,

    #[error("Incorrect password")]
    InvalidCredentials,

    #[error("The current session does not exist")]
    SessionNotFound,

    #[error("The current session does not match this client")]
    FingerprintMismatch,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Cryptographic failure: {0}")]
    InternalCryptoError(String),

    /// The account was persisted but the activation mail could not be sent.
    #[error("Activation notification could not be delivered: {0}")]
    NotificationDeliveryFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::InternalCryptoError(err.to_string())
    }
}
