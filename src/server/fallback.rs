//! Fallback mode
//!
//! When configuration or the data directory is unusable the server still
//! binds, but every request gets a 503 notice page with a reload link.

use crate::i18n::Translator;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Router that answers every request with the fallback page
pub fn fallback_router(translator: &Translator) -> Router {
    let page = Arc::new(render_page(translator));
    Router::new()
        .fallback(fallback_handler)
        .with_state(page)
}

async fn fallback_handler(State(page): State<Arc<String>>) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::RETRY_AFTER, "30"),
        ],
        page.as_str().to_owned(),
    )
        .into_response()
}

/// Render the notice in the translator's default locale
pub fn render_page(translator: &Translator) -> String {
    let params = BTreeMap::new();
    let title = escape_html(&translator.t(None, "fallback.title", &params));
    let body = escape_html(&translator.t(None, "fallback.body", &params));
    let reload = escape_html(&translator.t(None, "fallback.reload", &params));

    format!(
        r#"<!DOCTYPE html>
<html lang="{locale}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 480px;
            margin: 80px auto;
            padding: 20px;
            text-align: center;
        }}
        a {{ color: #2563eb; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>{body}</p>
    <p><a href="/">{reload}</a></p>
</body>
</html>"#,
        locale = escape_html(translator.default_locale()),
        title = title,
        body = body,
        reload = reload,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
