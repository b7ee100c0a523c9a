//! The plain-text notification handed to a [`Mailer`](super::Mailer).

use super::MailError;

/// A single-recipient plain-text email. The sender is the mailer's configured address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Option<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
}

impl EmailBuilder {
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn build(self) -> Result<Email, MailError> {
        let to = self
            .to
            .ok_or_else(|| MailError::Build("recipient required".into()))?;
        let subject = self
            .subject
            .ok_or_else(|| MailError::Build("subject required".into()))?;
        let text = self
            .text
            .ok_or_else(|| MailError::Build("body required".into()))?;

        Ok(Email {
            to,
            reply_to: self.reply_to,
            subject,
            text,
        })
    }
}
