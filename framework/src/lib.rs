//! Server side of the studio website: static pages, the quote request relay,
//! and a small client for submitting quotes.

extern crate self as atelier;

pub use atelier_macros::HttpError;

pub use axum::http;

pub mod config;
pub mod error;
pub mod intake;
pub mod mail;
pub mod quote;
pub mod routing;
pub mod serve;

pub use config::{EnvConfig, RelayConfig, SiteConfig};
pub use routing::site_router;
pub use serve::serve;
