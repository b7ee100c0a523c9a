use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{QuoteError, QuoteRequest, RawQuote};
use crate::config::RelayConfig;
use crate::mail::{Mailer, SmtpMailer};

#[derive(Clone)]
enum Delivery {
    Ready(Arc<dyn Mailer>),
    Unconfigured(Arc<str>),
}

/// Relay state shared by every `/api/quote` request.
///
/// Built once at startup. When the SMTP settings are incomplete the relay still
/// validates submissions but refuses to send them.
#[derive(Clone)]
pub struct QuoteRelay {
    delivery: Delivery,
    recipient: Arc<str>,
}

impl QuoteRelay {
    pub fn new(mailer: impl Mailer, recipient: impl Into<String>) -> Self {
        QuoteRelay {
            delivery: Delivery::Ready(Arc::new(mailer)),
            recipient: recipient.into().into(),
        }
    }

    /// A relay that rejects every valid submission with a configuration error.
    pub fn unconfigured(reason: impl Into<String>, recipient: impl Into<String>) -> Self {
        QuoteRelay {
            delivery: Delivery::Unconfigured(reason.into().into()),
            recipient: recipient.into().into(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        let recipient = config.recipient();
        let mailer = config
            .mailer_config()
            .and_then(SmtpMailer::from_config);

        match mailer {
            Ok(mailer) => {
                tracing::info!(%recipient, "quote relay ready");
                Self::new(mailer, recipient)
            }
            Err(e) => {
                tracing::warn!(%recipient, "quote relay disabled: {}", e);
                Self::unconfigured(e.to_string(), recipient)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.delivery, Delivery::Ready(_))
    }

    /// Why valid submissions will be refused, when the relay is unconfigured.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.delivery {
            Delivery::Ready(_) => None,
            Delivery::Unconfigured(reason) => Some(reason),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Send one notification for `request`. Nothing is retried.
    pub async fn relay(&self, request: &QuoteRequest) -> Result<(), QuoteError> {
        let mailer = match &self.delivery {
            Delivery::Ready(mailer) => mailer,
            Delivery::Unconfigured(reason) => {
                return Err(QuoteError::NotConfigured(reason.to_string()))
            }
        };

        let email = request.to_email(&self.recipient)?;
        mailer.send(&email).await?;

        tracing::info!(service = %request.service, "quote request relayed");
        Ok(())
    }
}

/// Body of a successful `/api/quote` response: `{"ok": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSent {
    pub ok: bool,
}

/// `POST /api/quote`
///
/// The body is read as JSON regardless of content type; anything unreadable is
/// handled as an empty submission.
pub async fn submit_quote(
    State(relay): State<QuoteRelay>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<QuoteSent>, QuoteError> {
    let raw = match body {
        Ok(bytes) => RawQuote::from_json_bytes(&bytes)?,
        Err(rejection) => {
            tracing::debug!("unreadable quote body: {}", rejection);
            RawQuote::default()
        }
    };

    let request = raw.validate().inspect_err(|e| {
        tracing::debug!("rejected quote request: {}", e);
    })?;

    relay.relay(&request).await?;
    Ok(Json(QuoteSent { ok: true }))
}
