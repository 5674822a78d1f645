//! Static file serving for the embedded marketing site
//!
//! Uses rust-embed to bundle the site/ folder into the binary.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Embedded site assets, populated at compile time from site/
#[derive(Embed)]
#[folder = "site/"]
struct SiteAssets;

/// Serve embedded static files.
/// Returns the file if found, or falls back to index.html for client-side routes.
pub async fn serve_static(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(response) = serve_file(path) {
        return response;
    }

    // Client-side routes such as /start or /contact
    if !path.contains('.') || path.ends_with(".html") {
        if let Some(response) = serve_file("index.html") {
            return response;
        }
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn serve_file(path: &str) -> Option<Response> {
    let file = SiteAssets::get(path)?;

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let cache_control = if path.starts_with("assets/") {
        "public, max-age=86400"
    } else {
        // HTML and other files should be revalidated
        "public, max-age=0, must-revalidate"
    };

    Some(
        (
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, cache_control.to_string()),
            ],
            file.data.into_owned(),
        )
            .into_response(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_embedded() {
        assert!(SiteAssets::get("index.html").is_some());
    }

    #[tokio::test]
    async fn test_unknown_route_falls_back_to_index() {
        let req = Request::builder().uri("/start").body(Body::empty()).unwrap();
        let response = serve_static(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/html"
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let req = Request::builder()
            .uri("/assets/missing.png")
            .body(Body::empty())
            .unwrap();
        let response = serve_static(req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
