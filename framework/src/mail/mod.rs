//! Outgoing email.
//!
//! A thin layer over [lettre](https://lettre.rs): an [`Email`] value, the
//! [`Mailer`] trait the quote relay sends through, an SMTP implementation and an
//! in-memory one for development and tests.
//!
//! ```ignore
//! let mailer = SmtpMailer::from_config(relay_config.mailer_config()?)?;
//! let email = Email::builder()
//!     .to("studio@example.com")
//!     .reply_to("client@example.com")
//!     .subject("New Quote Request — Printing")
//!     .text("...")
//!     .build()?;
//! mailer.send(&email).await?;
//! ```

mod mailer;
mod memory;
mod message;

pub use mailer::{Mailer, MailerConfig, SmtpMailer, TlsMode};
pub use memory::MemoryMailer;
pub use message::{Email, EmailBuilder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}
