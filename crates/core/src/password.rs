//! Argon2id password hashing and verification.
//!
//! Salts are generated with a caller-supplied cost factor so the operational
//! cost can be tuned from configuration. Digests use the PHC string format,
//! which embeds the algorithm parameters and salt, so [`verify_password`]
//! needs nothing but the stored digest.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::AuthError;

/// A random salt bound to the cost parameters it was generated for.
#[derive(Debug, Clone)]
pub struct PasswordSalt {
    salt: SaltString,
    params: Params,
}

impl PasswordSalt {
    /// Number of Argon2 iterations this salt will hash with.
    pub fn cost_factor(&self) -> u32 {
        self.params.t_cost()
    }
}

/// Generate a fresh random salt for the given cost factor.
///
/// The cost factor is the Argon2 iteration count; memory and parallelism use
/// the library defaults.
pub fn gen_salt(cost_factor: u32) -> Result<PasswordSalt, AuthError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        cost_factor,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| AuthError::InternalCryptoError(format!("invalid hashing parameters: {e}")))?;

    Ok(PasswordSalt {
        salt: SaltString::generate(&mut OsRng),
        params,
    })
}

/// Hash `plaintext` with the given salt, returning a PHC-formatted digest.
///
/// Empty input is hashed like any other; non-empty checks belong to input
/// validation.
pub fn hash_password(plaintext: &str, salt: &PasswordSalt) -> Result<String, AuthError> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, salt.params.clone());
    let hash = argon2.hash_password(plaintext.as_bytes(), &salt.salt)?;
    Ok(hash.to_string())
}

/// Verify `plaintext` against a stored PHC digest.
///
/// Returns `Ok(false)` on mismatch. The digest comparison is constant-time.
/// A malformed digest is an [`AuthError::InternalCryptoError`].
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
