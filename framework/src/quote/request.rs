use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{text_len, QuoteError, MESSAGE_MIN_CHARS, NAME_MIN_CHARS};
use crate::mail::{Email, MailError};

/// Service categories offered on the quote form.
///
/// The relay does not restrict submissions to this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceCategory {
    #[default]
    Publishing,
    BrandingAndDocumentation,
    GraphicAndLogoDesign,
    WebsiteAndAppDesign,
    Printing,
    DigitalProducts,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 6] = [
        ServiceCategory::Publishing,
        ServiceCategory::BrandingAndDocumentation,
        ServiceCategory::GraphicAndLogoDesign,
        ServiceCategory::WebsiteAndAppDesign,
        ServiceCategory::Printing,
        ServiceCategory::DigitalProducts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Publishing => "Publishing",
            ServiceCategory::BrandingAndDocumentation => "Branding & Documentation",
            ServiceCategory::GraphicAndLogoDesign => "Graphic & Logo Design",
            ServiceCategory::WebsiteAndAppDesign => "Website & App Design",
            ServiceCategory::Printing => "Printing",
            ServiceCategory::DigitalProducts => "Digital Products",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown service category: {0}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceCategory {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ServiceCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownService(wanted.to_string()))
    }
}

/// Submitted fields after lenient decoding and trimming, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuote {
    pub full_name: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

/// Text a JSON value turns into when a browser stringifies it: arrays join
/// their elements with `,`, objects become `[object Object]`, `null` is empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn field_text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .map(value_text)
        .unwrap_or_default()
        .trim()
        .to_string()
}

impl RawQuote {
    /// Decode a request body.
    ///
    /// A body that is not valid JSON, or is JSON but not an object, decodes as if
    /// it were `{}`. A literal `null` body has no fields to read and is refused
    /// with [`QuoteError::NullBody`].
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, QuoteError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(RawQuote {
                full_name: field_text(&fields, "fullName"),
                email: field_text(&fields, "email"),
                service: field_text(&fields, "service"),
                message: field_text(&fields, "message"),
            }),
            Ok(Value::Null) => Err(QuoteError::NullBody),
            _ => Ok(RawQuote::default()),
        }
    }

    /// Check the fields in order: name, email, service, message.
    ///
    /// Only the first failure is reported.
    pub fn validate(self) -> Result<QuoteRequest, QuoteError> {
        if text_len(&self.full_name) < NAME_MIN_CHARS {
            return Err(QuoteError::InvalidName);
        }
        if !self.email.contains('@') {
            return Err(QuoteError::InvalidEmail);
        }
        if self.service.is_empty() {
            return Err(QuoteError::MissingService);
        }
        if text_len(&self.message) < MESSAGE_MIN_CHARS {
            return Err(QuoteError::MessageTooShort);
        }

        Ok(QuoteRequest {
            full_name: self.full_name,
            email: self.email,
            service: self.service,
            message: self.message,
        })
    }
}

/// A validated quote request. Lives for one request and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub full_name: String,
    pub email: String,
    pub service: String,
    pub message: String,
}

impl QuoteRequest {
    pub fn subject(&self) -> String {
        format!("New Quote Request — {}", self.service)
    }

    pub fn body_text(&self) -> String {
        format!(
            "New Quote Request\n\nName: {}\nEmail: {}\nService: {}\n\nMessage:\n{}",
            self.full_name, self.email, self.service, self.message
        )
        .trim()
        .to_string()
    }

    /// Compose the notification sent to the studio inbox. Replies go to the submitter.
    pub fn to_email(&self, recipient: &str) -> Result<Email, MailError> {
        Email::builder()
            .to(recipient)
            .reply_to(&self.email)
            .subject(self.subject())
            .text(self.body_text())
            .build()
    }
}
