use std::sync::Arc;

use maxpizza_core::AuthCoordinator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Auth flows over the configured stores and notifier.
    pub auth: Arc<AuthCoordinator>,
}
