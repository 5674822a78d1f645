//! Command proxy handlers that route HTTP requests to backend commands
//!
//! Two endpoints share one request/response shape:
//! - `/api/invoke` for the public site (wizard, contact form, messages)
//! - `/api/admin/invoke` for the admin surface, behind the Bearer token
//!
//! Command routing lives in the `routes/` sub-modules.

use super::routes;
use super::ServerAppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for the invoke endpoints
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Command name (e.g., "create_wizard", "list_submissions")
    pub cmd: String,
    /// Command arguments as JSON object
    #[serde(default)]
    pub args: Value,
}

/// Response body for the invoke endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error type for invoke handlers
pub struct InvokeError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for InvokeError {
    fn into_response(self) -> Response {
        let body = InvokeResponse {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Public invoke handler
pub async fn invoke_handler(
    State(state): State<ServerAppState>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, InvokeError> {
    log::debug!("Invoke command: {}", req.cmd);
    let result = routes::route_public_command(&req.cmd, req.args, &state).await;
    respond(&req.cmd, result)
}

/// Admin invoke handler
pub async fn admin_invoke_handler(
    State(state): State<ServerAppState>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, InvokeError> {
    log::debug!("Admin command: {} with args: {:?}", req.cmd, req.args);
    let result = routes::route_admin_command(&req.cmd, req.args, &state).await;
    respond(&req.cmd, result)
}

fn respond(cmd: &str, result: Result<Value, String>) -> Result<Json<InvokeResponse>, InvokeError> {
    match result {
        Ok(data) => Ok(Json(InvokeResponse {
            success: true,
            data: Some(data),
            error: None,
        })),
        Err(e) => {
            log::warn!("Command {} failed: {}", cmd, e);
            Err(InvokeError {
                status: StatusCode::BAD_REQUEST,
                message: e,
            })
        }
    }
}
