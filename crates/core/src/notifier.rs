//! Outbound notifications sent by the registration flow.

use async_trait::async_trait;

/// Everything needed to tell a new account holder how to activate.
#[derive(Debug, Clone)]
pub struct ActivationNotice {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub activation_url: String,
}

/// Delivery failure reported by a [`Notifier`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Delivers activation links to newly registered accounts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError>;
}
