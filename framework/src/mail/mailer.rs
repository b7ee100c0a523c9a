//! Mailer trait and SMTP implementation.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Email, MailError};

/// Async email sending trait.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (SMTPS).
    Implicit,
    /// Plaintext connection upgraded with STARTTLS when the server offers it.
    Opportunistic,
}

impl TlsMode {
    /// Port 465 is SMTPS; everything else starts in plaintext.
    pub fn for_port(port: u16) -> Self {
        if port == 465 {
            TlsMode::Implicit
        } else {
            TlsMode::Opportunistic
        }
    }
}

/// Connection settings for [`SmtpMailer`].
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address.
    pub from: String,
}

impl MailerConfig {
    pub fn tls(&self) -> TlsMode {
        TlsMode::for_port(self.port)
    }
}

/// SMTP-based mailer using lettre.
///
/// Each [`Mailer::send`] opens its own session; connections are not pooled.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    tls: TlsMode,
}

impl SmtpMailer {
    pub fn from_config(config: MailerConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;
        let tls = config.tls();

        let builder = match tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            TlsMode::Opportunistic => {
                let params = TlsParameters::new(config.host.clone())
                    .map_err(|e| MailError::Smtp(e.to_string()))?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                    .tls(Tls::Opportunistic(params))
            }
        };

        tracing::info!(host = %config.host, port = config.port, ?tls, "configured SMTP relay");

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            from,
            tls,
        })
    }

    pub fn tls(&self) -> TlsMode {
        self.tls
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

/// Build the plain-text lettre [`Message`] for `email`, sent from `from`.
pub(crate) fn build_message(email: &Email, from: &Mailbox) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&email.to)?);

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    builder
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(email.text.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let message = build_message(email, &self.from)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn studio() -> Mailbox {
        "Studio <noreply@studio.example>".parse().unwrap()
    }

    fn config(port: u16, from: &str) -> MailerConfig {
        MailerConfig {
            host: "smtp.example.com".into(),
            port,
            username: "relay".into(),
            password: "secret".into(),
            from: from.into(),
        }
    }

    #[test]
    fn smtps_only_on_465() {
        assert_eq!(TlsMode::for_port(465), TlsMode::Implicit);
        assert_eq!(TlsMode::for_port(587), TlsMode::Opportunistic);
        assert_eq!(TlsMode::for_port(25), TlsMode::Opportunistic);
    }

    #[test]
    fn mailer_builds_for_either_tls_mode() {
        let smtps = SmtpMailer::from_config(config(465, "noreply@studio.example")).unwrap();
        assert_eq!(smtps.tls(), TlsMode::Implicit);

        let starttls = SmtpMailer::from_config(config(587, "noreply@studio.example")).unwrap();
        assert_eq!(starttls.tls(), TlsMode::Opportunistic);
    }

    #[test]
    fn message_is_plain_text_with_reply_to() {
        let email = Email::builder()
            .to("inbox@studio.example")
            .reply_to("client@example.com")
            .subject("New Quote Request")
            .text("Name: Ada")
            .build()
            .unwrap();

        let message = build_message(&email, &studio()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: Studio <noreply@studio.example>"));
        assert!(raw.contains("To: inbox@studio.example"));
        assert!(raw.contains("Reply-To: client@example.com"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn unparseable_reply_to_is_rejected() {
        let email = Email::builder()
            .to("inbox@studio.example")
            .reply_to("not an address@")
            .subject("Hi")
            .text("Body")
            .build()
            .unwrap();

        assert!(matches!(
            build_message(&email, &studio()),
            Err(MailError::InvalidAddress(addr)) if addr == "not an address@"
        ));
    }

    #[test]
    fn invalid_sender_fails_configuration() {
        assert!(matches!(
            SmtpMailer::from_config(config(587, "nobody")),
            Err(MailError::InvalidAddress(_))
        ));
    }
}
