//! Embedded chat frontend.
//!
//! The archive ships as a single binary: the chat page and its two
//! static assets are compiled in with `include_str!` and served from
//! fixed routes. Nothing is read from the filesystem at runtime.

use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
};

const INDEX_HTML: &str = include_str!("../../../frontend/index.html");
const STYLE_CSS: &str = include_str!("../../../frontend/style.css");
const APP_JS: &str = include_str!("../../../frontend/app.js");

/// Routes for the chat page and its assets.
pub fn frontend_router() -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route(
            "/static/style.css",
            get(|| asset("text/css; charset=utf-8", STYLE_CSS)),
        )
        .route(
            "/static/app.js",
            get(|| asset("application/javascript; charset=utf-8", APP_JS)),
        )
}

async fn chat_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn asset(content_type: &'static str, body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
