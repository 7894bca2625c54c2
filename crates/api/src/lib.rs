//! Max Pizza auth API server library.
//!
//! Exposes the building blocks (config, state, error handling, extractors,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
