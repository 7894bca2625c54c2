//! Client fingerprint derivation from request metadata.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{ACCEPT_LANGUAGE, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderName;
use maxpizza_core::fingerprint::Fingerprint;
use sha2::{Digest, Sha256};

/// Fingerprint of the calling client, derived from its user agent, accepted
/// languages and peer address.
///
/// Never rejects: a request with none of these still gets a fingerprint,
/// and the peer address is only known when the server was started with
/// connect info.
#[derive(Debug, Clone)]
pub struct ClientFingerprint(pub Fingerprint);

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let user_agent = header(USER_AGENT);
        let accept_language = header(ACCEPT_LANGUAGE);
        let ip_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Self(derive(user_agent, accept_language, ip_address)))
    }
}

/// Build a fingerprint whose `id` is the SHA-256 hex of its components.
pub fn derive(
    user_agent: Option<String>,
    accept_language: Option<String>,
    ip_address: Option<String>,
) -> Fingerprint {
    let mut hasher = Sha256::new();
    for part in [&user_agent, &accept_language, &ip_address] {
        hasher.update(part.as_deref().unwrap_or_default().as_bytes());
        hasher.update(b"\n");
    }
    Fingerprint {
        id: format!("{:x}", hasher.finalize()),
        user_agent,
        accept_language,
        ip_address,
    }
}
