//! Authentication middleware for the admin surface
//!
//! The public site and its command proxy are open. Requests under
//! `/api/admin/` need a Bearer token; `/ws/` endpoints take it as a
//! `token` query parameter because browsers cannot set headers on WebSockets.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::Layer;

/// Authentication layer that validates Bearer tokens
#[derive(Clone)]
pub struct AuthLayer {
    token: Arc<String>,
}

impl AuthLayer {
    pub fn new(token: String) -> Self {
        Self {
            token: Arc::new(token),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            token: self.token.clone(),
        }
    }
}

/// The actual middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    token: Arc<String>,
}

impl<S> tower::Service<Request> for AuthMiddleware<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = self.token.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Skip auth for CORS preflight OPTIONS requests
            if req.method() == Method::OPTIONS || !requires_auth(req.uri().path()) {
                return inner.call(req).await;
            }

            let authorized = if req.uri().path().starts_with("/ws/") {
                query_token(req.uri().query()) == Some(token.as_str())
            } else {
                bearer_token(&req) == Some(token.as_str())
            };

            if authorized {
                return inner.call(req).await;
            }

            log::debug!("Rejected unauthenticated request to {}", req.uri().path());
            Ok((
                StatusCode::UNAUTHORIZED,
                "Unauthorized: Invalid or missing Bearer token",
            )
                .into_response())
        })
    }
}

/// Whether a path belongs to the admin surface
pub fn requires_auth(path: &str) -> bool {
    path.starts_with("/api/admin/") || path.starts_with("/ws/")
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn query_token(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
}

/// Generate a random admin token (32 hex chars)
pub fn generate_auth_token() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_auth_token() {
        let token = generate_auth_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_auth_token());
    }

    #[test]
    fn test_requires_auth() {
        assert!(requires_auth("/api/admin/invoke"));
        assert!(requires_auth("/ws/events"));
        assert!(!requires_auth("/api/invoke"));
        assert!(!requires_auth("/health"));
        assert!(!requires_auth("/"));
    }

    #[test]
    fn test_query_token() {
        assert_eq!(query_token(Some("token=abc")), Some("abc"));
        assert_eq!(query_token(Some("x=1&token=abc")), Some("abc"));
        assert_eq!(query_token(Some("mytoken=abc")), None);
        assert_eq!(query_token(None), None);
    }
}
