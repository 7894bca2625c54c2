//! Authentication and session lifecycle for the Max Pizza ordering backend.
//!
//! - [`password`] -- Argon2id salt generation, hashing and verification.
//! - [`token`] -- HS256 access/refresh token signing and verification.
//! - [`fingerprint`] -- client fingerprint storage and identity comparison.
//! - [`store`] / [`notifier`] -- persistence and notification seams.
//! - [`coordinator`] -- the register/activate/authenticate/rotate flows.
//! - [`memory`] -- in-memory implementations of the seams.

pub mod account;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fingerprint;
pub mod memory;
pub mod notifier;
pub mod password;
pub mod session;
pub mod store;
pub mod token;
pub mod types;
pub mod validation;

pub use coordinator::AuthCoordinator;
pub use error::{AuthError, StoreError};
