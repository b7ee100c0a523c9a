use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Email, Mailer, MailError};

/// In-memory [`Mailer`] for development and testing.
///
/// Messages are kept in a `Vec` behind a mutex and never leave the process.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message accepted so far, oldest first.
    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            reply_to = ?email.reply_to,
            subject = %email.subject,
            "captured email instead of sending"
        );
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
