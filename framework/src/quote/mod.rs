//! Quote requests: decoding, validation, and relaying them by email.

mod relay;
mod request;

pub use relay::{submit_quote, QuoteRelay, QuoteSent};
pub use request::{QuoteRequest, RawQuote, ServiceCategory, UnknownService};

use axum::response::{IntoResponse, Response};

use crate::error::{json_error, HttpError as _};
use crate::mail::MailError;

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 10;

/// Field length as a browser reports it, in UTF-16 code units.
pub(crate) fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

#[derive(Debug, thiserror::Error, crate::HttpError)]
pub enum QuoteError {
    #[error("Name is required.")]
    #[http_error(BAD_REQUEST)]
    InvalidName,

    #[error("Valid email is required.")]
    #[http_error(BAD_REQUEST)]
    InvalidEmail,

    #[error("Service is required.")]
    #[http_error(BAD_REQUEST)]
    MissingService,

    #[error("Message is too short.")]
    #[http_error(BAD_REQUEST)]
    MessageTooShort,

    #[error("request body was JSON null")]
    #[http_error(INTERNAL_SERVER_ERROR, "Failed to send. Please try again.")]
    NullBody,

    #[error("mail relay not configured, missing: {0}")]
    #[http_error(
        INTERNAL_SERVER_ERROR,
        "Email server is not configured. Missing SMTP environment variables."
    )]
    NotConfigured(String),

    #[error("quote delivery failed: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Failed to send. Please try again.")]
    Delivery(#[from] MailError),

    #[error("quote handler panicked: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "Failed to send. Please try again.")]
    Panicked(String),
}

impl QuoteError {
    pub fn is_validation(&self) -> bool {
        self.http_code().is_client_error()
    }
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        json_error(&self)
    }
}
