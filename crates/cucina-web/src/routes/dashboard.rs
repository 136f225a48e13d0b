//! Dashboard route handler.
//!
//! Serves the embedded landing page. The live rendering layer lives in
//! the native client; this page only documents the endpoints.

use axum::response::{Html, IntoResponse};

const DASHBOARD_HTML: &str = include_str!("../../../../assets/web/index.html");

/// GET / - Serve the landing page.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
