//! Notifier used when no SMTP server is configured.

use async_trait::async_trait;
use maxpizza_core::notifier::{ActivationNotice, Notifier, NotifyError};

/// Writes activation links to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        tracing::warn!(
            to = %notice.email,
            activation_url = %notice.activation_url,
            "SMTP not configured; activation link logged instead of mailed"
        );
        Ok(())
    }
}
