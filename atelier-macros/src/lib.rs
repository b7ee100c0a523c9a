extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod http_error;

/// Derive `atelier::error::HttpError` for an error enum.
///
/// Every variant carries `#[http_error(...)]` with one or two arguments:
/// - status code (required), either a `StatusCode` constant (`BAD_REQUEST`) or a number (`400`)
/// - public message (optional), a string literal with basic interpolation
///
/// Tuple variants interpolate by index (`"field {0}"`), struct variants by field name
/// (`"field {name}"`). Without a message the `Display` implementation is used, so
/// only variants whose internal detail must stay private need one.
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error, atelier::HttpError)]
/// enum SubmitError {
///     #[error("Name is required.")]
///     #[http_error(BAD_REQUEST)]
///     InvalidName,
///
///     #[error("smtp failure: {0}")]
///     #[http_error(INTERNAL_SERVER_ERROR, "Failed to send. Please try again.")]
///     Delivery(#[from] MailError),
/// }
/// ```
#[proc_macro_derive(HttpError, attributes(http_error))]
pub fn http_error_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    http_error::http_error_derive_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
