//! Notifier: outbound transactional email.
//!
//! All email leaves the service through the `Notifier` trait carried in `AppState`.
//! Production: `SesNotifier`. Tests: `RecordingNotifier`.

pub mod email;
pub mod ses;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::errors::AppError;

/// A fully rendered email, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one email and returns the provider's message id.
    async fn send(&self, message: &EmailMessage) -> Result<String, AppError>;
}
