//! Outbound user notifications.
//!
//! Delivery is best-effort: callers hand a message to [`dispatch`] and carry on.
//! The only transport shipped here is [`LogNotifier`], which records each
//! message through `tracing`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::user::User;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

pub const WELCOME_SUBJECT: &str = "Welcome to CookBook!";

/// The fixed welcome mail sent after signup.
pub fn welcome_email(user: &User) -> EmailMessage {
    let body = format!(
        "Dear {},\n\n\
         Congratulations and welcome to CookBook!\n\n\
         We are thrilled to have you join our community of passionate bloggers. You can now start sharing your thoughts, ideas, and stories with a wider audience. Here's to your first post and many more to come!\n\n\
         To get started, you can visit your dashboard and begin creating new content. If you have any questions or need assistance, feel free to reach out to our support team at support@CookBook.com.\n\n\
         Happy Cooking and welcome aboard!\n\n\
         Best regards,\n\
         The CookBook Team\n\n\
         P.S. Don't forget to explore our blog tips and guidelines to make the most of your blogging journey.",
        user.username
    );
    EmailMessage { recipient: user.email.clone(), subject: WELCOME_SUBJECT.into(), body }
}

/// Send on a background task bounded by `timeout`. Failures are logged, never retried.
pub fn dispatch(notifier: Arc<dyn Notifier>, message: EmailMessage, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let recipient = message.recipient.clone();
        let outcome = match tokio::time::timeout(timeout, notifier.send(message)).await {
            Ok(res) => res,
            Err(_) => Err(NotificationError::Timeout(timeout)),
        };
        match outcome {
            Ok(()) => info!(%recipient, "notification_sent"),
            Err(e) => warn!(%recipient, error = %e, "notification_failed"),
        }
    })
}

/// Transport that only logs the message.
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        info!(
            from = %self.sender,
            to = %message.recipient,
            subject = %message.subject,
            bytes = message.body.len(),
            "email delivered to log transport"
        );
        Ok(())
    }
}

/// Notifiers for tests and doc examples
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    /// Keeps every message it is asked to send.
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingNotifier {
        pub async fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    /// Always fails, optionally after a delay.
    #[derive(Default)]
    pub struct FailingNotifier {
        pub delay: Option<Duration>,
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _message: EmailMessage) -> Result<(), NotificationError> {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            Err(NotificationError::Delivery("smtp unavailable".into()))
        }
    }
}
