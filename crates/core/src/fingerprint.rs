//! Client fingerprints bound to sessions.
//!
//! A fingerprint is produced outside this crate from request metadata and is
//! stored as an opaque serialized string. Two fingerprints are considered the
//! same client when their `id` fields match; the other components are kept
//! for auditing only and never compared.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Serialized signature of the client that opened a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    /// Stable identity of the client. The only field used for equality.
    pub id: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub accept_language: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Fingerprint {
    /// Serialize for storage alongside a session.
    pub fn to_stored(&self) -> Result<String, AuthError> {
        serde_json::to_string(self)
            .map_err(|e| AuthError::InternalCryptoError(format!("fingerprint encoding: {e}")))
    }

    /// Parse a previously stored fingerprint.
    pub fn from_stored(stored: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stored)
    }

    pub fn same_identity(&self, other: &Fingerprint) -> bool {
        self.id == other.id
    }
}

/// Serialize an optional fingerprint. An absent fingerprint is stored as absent.
pub fn serialize(fingerprint: Option<&Fingerprint>) -> Result<Option<String>, AuthError> {
    fingerprint.map(Fingerprint::to_stored).transpose()
}

/// Compare the identity of a stored fingerprint with a presented one.
///
/// Only the `id` fields are compared. A session opened without a fingerprint
/// matches only a request that presents none. A stored value that no longer
/// parses never matches.
pub fn identity_matches(stored: Option<&str>, presented: Option<&Fingerprint>) -> bool {
    match (stored, presented) {
        (None, None) => true,
        (Some(raw), Some(presented)) => match Fingerprint::from_stored(raw) {
            Ok(stored) => stored.same_identity(presented),
            Err(e) => {
                tracing::warn!(error = %e, "Stored session fingerprint is unreadable");
                false
            }
        },
        _ => false,
    }
}
