//! Activation e-mail delivery.
//!
//! [`SmtpNotifier`] sends activation links over SMTP when `SMTP_HOST` is
//! configured; [`LogNotifier`] stands in for it otherwise.

pub mod email;
pub mod log;

pub use email::{EmailConfig, EmailError, SmtpNotifier, DEFAULT_FROM_ADDRESS, DEFAULT_SMTP_PORT};
pub use log::LogNotifier;
