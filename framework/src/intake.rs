//! Client side of quote submission.
//!
//! [`QuoteForm`] mirrors the quote page: four fields, local checks that gate
//! the submit action, and a small status machine
//! `Idle -> Sending -> (Sent | Error)`. The local checks only decide whether to
//! send; the relay validates again.

use serde_json::Value;

use crate::quote::{text_len, QuoteRequest, ServiceCategory, MESSAGE_MIN_CHARS, NAME_MIN_CHARS};

pub const INCOMPLETE_FORM: &str =
    "Please complete all fields (message should be at least 10 characters).";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const NETWORK_FAILURE: &str = "Network error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Sending,
    /// Terminal: the form is done once a submission succeeds.
    Sent,
    /// The last attempt failed; the form stays editable and may be submitted again.
    Error(String),
}

/// HTTP client for the relay endpoint.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl QuoteClient {
    /// `endpoint` is the full URL of the relay, e.g. `https://studio.example/api/quote`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        QuoteClient {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Client for the relay of the site at `base_url`.
    pub fn for_site(base_url: &str) -> Self {
        Self::new(format!("{}/api/quote", base_url.trim_end_matches('/')))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &QuoteRequest) -> SubmitStatus {
        let response = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, "quote request did not complete: {}", e);
                return SubmitStatus::Error(NETWORK_FAILURE.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            return SubmitStatus::Sent;
        }

        let body = response.json::<Value>().await.ok();
        let message = body
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(GENERIC_FAILURE);

        tracing::debug!(status = status.as_u16(), "quote request refused: {}", message);
        SubmitStatus::Error(message.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuoteForm {
    pub full_name: String,
    pub email: String,
    pub service: ServiceCategory,
    pub message: String,
    status: SubmitStatus,
}

impl QuoteForm {
    /// A filled-in form that has not been submitted yet.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        service: ServiceCategory,
        message: impl Into<String>,
    ) -> Self {
        QuoteForm {
            full_name: full_name.into(),
            email: email.into(),
            service,
            message: message.into(),
            status: SubmitStatus::Idle,
        }
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// Whether the submit action is enabled.
    pub fn can_send(&self) -> bool {
        text_len(self.full_name.trim()) >= NAME_MIN_CHARS
            && self.email.trim().contains('@')
            && text_len(self.message.trim()) >= MESSAGE_MIN_CHARS
            && self.status != SubmitStatus::Sending
    }

    /// The trimmed payload that would be posted.
    pub fn payload(&self) -> QuoteRequest {
        QuoteRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            service: self.service.label().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Attempt delivery once. Never retries; a failed attempt leaves the form
    /// in [`SubmitStatus::Error`] until the caller submits again.
    pub async fn submit(&mut self, client: &QuoteClient) -> &SubmitStatus {
        if self.status == SubmitStatus::Sent {
            return &self.status;
        }

        if !self.can_send() {
            self.status = SubmitStatus::Error(INCOMPLETE_FORM.to_string());
            return &self.status;
        }

        self.status = SubmitStatus::Sending;
        let payload = self.payload();
        self.status = client.post(&payload).await;
        &self.status
    }
}
