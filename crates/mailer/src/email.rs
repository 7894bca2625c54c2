//! Activation e-mails via SMTP.
//!
//! [`SmtpNotifier`] wraps the `lettre` async SMTP transport to send the
//! plain-text activation message for new accounts. [`EmailConfig`] is filled
//! in by the server's configuration loader; without an SMTP host no mailer
//! is constructed.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use maxpizza_core::notifier::{ActivationNotice, Notifier, NotifyError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address.
pub const DEFAULT_FROM_ADDRESS: &str = "noreply@maxpizza.local";

const ACTIVATION_SUBJECT: &str = "🍕 Max Pizza registration";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587.
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Settings for `smtp_host` with the default port and sender and no
    /// credentials.
    pub fn new(smtp_host: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: DEFAULT_SMTP_PORT,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }
}

/// Render the plain-text body of an activation e-mail.
pub fn activation_body(notice: &ActivationNotice) -> String {
    format!(
        "Hello, {} {}!\n\n\
         Thank you for signing up to Max Pizza.\n\
         Follow the link below to complete your registration:\n\n\
         {}\n",
        notice.first_name, notice.last_name, notice.activation_url
    )
}

/// Assemble the activation message for `notice`.
pub fn activation_message(from: &str, notice: &ActivationNotice) -> Result<Message, EmailError> {
    Message::builder()
        .from(from.parse()?)
        .to(notice.email.parse()?)
        .subject(ACTIVATION_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(activation_body(notice))
        .map_err(|e| EmailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// SmtpNotifier
// ---------------------------------------------------------------------------

/// Sends activation e-mails via SMTP.
pub struct SmtpNotifier {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Build the transport once; connections are opened per message.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: transport_builder.build(),
            config,
        })
    }

    async fn deliver(&self, notice: &ActivationNotice) -> Result<(), EmailError> {
        let email = activation_message(&self.config.from_address, notice)?;
        self.transport.send(email).await?;
        tracing::info!(to = %notice.email, "Activation email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_activation(&self, notice: &ActivationNotice) -> Result<(), NotifyError> {
        self.deliver(notice).await.map_err(|e| {
            tracing::warn!(to = %notice.email, error = %e, "Activation email failed");
            NotifyError(e.to_string())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(email: &str) -> ActivationNotice {
        ActivationNotice {
            email: email.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            activation_url: "http://localhost:3000/auth/confirm/abc".into(),
        }
    }

    #[test]
    fn new_config_uses_starttls_port_and_default_sender() {
        let config = EmailConfig::new("smtp.maxpizza.test");
        assert_eq!(config.smtp_host, "smtp.maxpizza.test");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.from_address, "noreply@maxpizza.local");
        assert!(config.smtp_user.is_none());
    }

    #[test]
    fn body_greets_by_name_and_carries_link() {
        let body = activation_body(&notice("ada@x.com"));
        assert!(body.starts_with("Hello, Ada Lovelace!"));
        assert!(body.contains("http://localhost:3000/auth/confirm/abc"));
    }

    #[test]
    fn message_is_addressed_to_the_account() {
        let message = activation_message("noreply@maxpizza.local", &notice("ada@x.com")).unwrap();
        let headers = message.headers().to_string();
        assert!(headers.contains("To: ada@x.com"));
        assert!(headers.contains("From: noreply@maxpizza.local"));
    }

    #[test]
    fn bad_recipient_is_an_address_error() {
        let err = activation_message("noreply@maxpizza.local", &notice("not-an-email")).unwrap_err();
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
