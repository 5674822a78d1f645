//! Command routing modules
//!
//! Command routing is split by domain:
//! - wizard_routes: step catalogue, field checks, estimates and wizard sessions
//! - contact_routes: contact form submit (public) and contact management (admin)
//! - submission_routes: submission management (admin)
//! - config_routes: message catalogs (public), config and maintenance (admin)

pub mod config_routes;
pub mod contact_routes;
pub mod submission_routes;
pub mod wizard_routes;

use serde_json::Value;
use std::sync::Arc;

use super::ServerAppState;
use crate::storage::FileDocumentStore;

// =============================================================================
// Helper functions for use by route modules
// =============================================================================

/// Extract a required argument from JSON args
pub fn get_arg<T: serde::de::DeserializeOwned>(args: &Value, name: &str) -> Result<T, String> {
    serde_json::from_value(
        args.get(name)
            .ok_or_else(|| format!("Missing argument: {}", name))?
            .clone(),
    )
    .map_err(|e| format!("Invalid argument {}: {}", name, e))
}

/// Extract an optional argument from JSON args
pub fn get_opt_arg<T: serde::de::DeserializeOwned>(
    args: &Value,
    name: &str,
) -> Result<Option<T>, String> {
    match args.get(name) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("Invalid argument {}: {}", name, e)),
        _ => Ok(None),
    }
}

/// Run a blocking store operation off the async workers
pub async fn with_store<T, F>(state: &ServerAppState, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&FileDocumentStore) -> Result<T, String> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| format!("Store task failed: {}", e))?
}

// =============================================================================
// Command Routing Macros
// =============================================================================

/// Routes an async command: awaits the handler, serializes the result
#[macro_export]
macro_rules! route_async {
    ($handler:expr) => {{
        let result = $handler.await?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

/// Routes a sync command
#[macro_export]
macro_rules! route_sync {
    ($handler:expr) => {{
        let result = $handler?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

/// Routes a command that cannot fail
#[macro_export]
macro_rules! route_value {
    ($handler:expr) => {{
        serde_json::to_value($handler).map_err(|e| e.to_string())
    }};
}

pub use route_async;
pub use route_sync;
pub use route_value;

// =============================================================================
// Dispatchers
// =============================================================================

/// Route a public command
pub async fn route_public_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    if wizard_routes::is_wizard_command(cmd) {
        return wizard_routes::route_wizard_command(cmd, args, state).await;
    }

    if contact_routes::is_contact_command(cmd) {
        return contact_routes::route_contact_command(cmd, args, state).await;
    }

    if config_routes::is_i18n_command(cmd) {
        return config_routes::route_i18n_command(cmd, args, state).await;
    }

    Err(format!("Unknown command: {}", cmd))
}

/// Route an admin command
pub async fn route_admin_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    if submission_routes::is_submission_command(cmd) {
        return submission_routes::route_submission_command(cmd, args, state).await;
    }

    if contact_routes::is_contact_admin_command(cmd) {
        return contact_routes::route_contact_admin_command(cmd, args, state).await;
    }

    if config_routes::is_config_command(cmd) {
        return config_routes::route_config_command(cmd, args, state).await;
    }

    Err(format!("Unknown admin command: {}", cmd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_arg() {
        let args = json!({"wizardId": "wiz_0123456789ab", "step": 3});
        let id: String = get_arg(&args, "wizardId").unwrap();
        assert_eq!(id, "wiz_0123456789ab");
        let step: usize = get_arg(&args, "step").unwrap();
        assert_eq!(step, 3);

        let missing: Result<String, _> = get_arg(&args, "field");
        assert_eq!(missing.unwrap_err(), "Missing argument: field");

        let wrong: Result<usize, _> = get_arg(&args, "wizardId");
        assert!(wrong.unwrap_err().starts_with("Invalid argument wizardId"));
    }

    #[test]
    fn test_get_opt_arg() {
        let args = json!({"locale": "es", "limit": null});
        let locale: Option<String> = get_opt_arg(&args, "locale").unwrap();
        assert_eq!(locale.as_deref(), Some("es"));
        let limit: Option<usize> = get_opt_arg(&args, "limit").unwrap();
        assert_eq!(limit, None);
        let absent: Option<usize> = get_opt_arg(&args, "offset").unwrap();
        assert_eq!(absent, None);
    }
}
