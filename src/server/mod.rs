//! HTTP/WebSocket server for the intake site
//!
//! Serves the embedded site, the public command proxy used by the wizard and
//! contact form, and the token-protected admin proxy and event stream.

mod auth;
mod events;
mod fallback;
mod proxy;
pub mod routes;
pub mod state;
mod static_files;

pub use auth::{generate_auth_token, AuthLayer};
pub use events::{EventBroadcaster, ServerEvent};
pub use fallback::fallback_router;
pub use proxy::{InvokeRequest, InvokeResponse};
pub use state::ServerAppState;

use crate::config::ServerConfig;
use crate::shutdown::ShutdownState;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

/// Build the CORS layer: listed origins only, or any origin when the list is empty
fn cors_layer(origins: &[String]) -> CorsLayer {
    // Explicit headers instead of Any so browsers accept Authorization
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        layer.allow_origin(allowed)
    }
}

/// Build the full application router
///
/// Layer order: cors (outer) -> auth -> handler, so CORS preflight requests
/// are answered before the auth check.
pub fn build_router(state: ServerAppState) -> Router {
    Router::new()
        .route("/api/invoke", post(proxy::invoke_handler))
        .route("/api/admin/invoke", post(proxy::admin_invoke_handler))
        .route("/ws/events", get(events::ws_handler))
        .route("/health", get(health_handler))
        .route("/api/version", get(version_handler))
        .fallback(static_files::serve_static)
        .layer(AuthLayer::new(state.auth_token.clone()))
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

/// Run the HTTP/WebSocket server until shutdown is requested
pub async fn run_server(state: ServerAppState) -> Result<(), String> {
    let server = state.config.server.clone();
    let shutdown_state = state.shutdown_state.clone();
    let sessions = state.sessions.clone();

    state.start_background_tasks();
    let app = build_router(state.clone());
    let listener = bind(&server).await?;

    let cors_display = if server.cors_origins.is_empty() {
        "*".to_string()
    } else {
        server.cors_origins.join(", ")
    };
    log::info!("Intake site listening on http://{}:{}", server.bind, server.port);
    log::info!("Data directory: {:?}", state.store.data_dir());
    log::info!("CORS origins: {}", cors_display);
    log::info!("Admin endpoints: POST /api/admin/invoke, GET /ws/events (Bearer token)");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_state.wait(SHUTDOWN_POLL_INTERVAL).await;
            log::info!("Shutdown signal received, stopping server...");
        })
        .await;
    crate::map_err_str!(served, "Server error")?;

    sessions.shutdown().log();
    Ok(())
}

/// Serve the fallback page on every path until shutdown is requested
pub async fn run_fallback_server(
    server: &ServerConfig,
    translator: &crate::i18n::Translator,
    shutdown_state: ShutdownState,
) -> Result<(), String> {
    let listener = bind(server).await?;
    log::warn!(
        "Serving fallback page on http://{}:{}",
        server.bind,
        server.port
    );

    let served = axum::serve(listener, fallback_router(translator))
        .with_graceful_shutdown(async move { shutdown_state.wait(SHUTDOWN_POLL_INTERVAL).await })
        .await;
    crate::map_err_str!(served, "Server error")
}

async fn bind(server: &ServerConfig) -> Result<TcpListener, String> {
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
