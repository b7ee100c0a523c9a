use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub use atelier_macros::HttpError;

/// Maps an error onto an HTTP status and the message that is safe to show a user.
///
/// Usually derived with `#[derive(HttpError)]` rather than implemented by hand.
pub trait HttpError: std::fmt::Display {
    fn http_code(&self) -> StatusCode;
    fn http_message(&self) -> String;
}

/// Error body shared by every JSON endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
        }
    }
}

/// Render an [`HttpError`] as a JSON response.
///
/// Server errors are logged with their internal `Display` text, which never
/// reaches the response body.
pub fn json_error<E: HttpError>(err: &E) -> Response {
    let code = err.http_code();
    if code.is_server_error() {
        tracing::error!(status = code.as_u16(), "{}", err);
    }
    (code, Json(ErrorBody::new(err.http_message()))).into_response()
}
