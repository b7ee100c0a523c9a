use std::any::Any;
use std::path::Path;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::quote::{self, QuoteError, QuoteRelay};

/// Static pages and the file each one is served from, relative to the site directory.
pub const PAGES: [(&str, &str); 6] = [
    ("/", "index.html"),
    ("/services", "services.html"),
    ("/portfolio", "portfolio.html"),
    ("/products", "products.html"),
    ("/quote", "quote.html"),
    ("/contact", "contact.html"),
];

/// Build the full site: the quote relay API plus the static pages in `site_dir`.
pub fn site_router(site_dir: impl AsRef<Path>, relay: QuoteRelay) -> Router {
    let site_dir = site_dir.as_ref();

    let pages = PAGES.iter().fold(Router::new(), |router, (route, file)| {
        router.route_service(route, ServeFile::new(site_dir.join(file)))
    });

    pages
        .merge(api_router(relay))
        .fallback_service(ServeDir::new(site_dir))
        .layer(TraceLayer::new_for_http())
}

/// The JSON API on its own, without static files.
pub fn api_router(relay: QuoteRelay) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/quote", post(quote::submit_quote))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(relay)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    QuoteError::Panicked(detail).into_response()
}
