//! Configuration, maintenance and localization command routing
//!
//! Public: get_messages, translate
//! Admin: get_config, rebuild_indexes

use crate::commands::{i18n, submissions};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{get_arg, get_opt_arg, route_sync, route_value, with_store, ServerAppState};

/// Route localization commands
pub async fn route_i18n_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "get_messages" => {
            let locale: Option<String> = get_opt_arg(&args, "locale")?;
            route_value!(i18n::get_messages(&state.translator, locale.as_deref()))
        }

        "translate" => {
            let key: String = get_arg(&args, "key")?;
            let locale: Option<String> = get_opt_arg(&args, "locale")?;
            let params: Option<BTreeMap<String, String>> = get_opt_arg(&args, "params")?;
            route_value!(i18n::translate(
                &state.translator,
                locale.as_deref(),
                &key,
                params
            ))
        }

        _ => Err(format!("Unknown i18n command: {}", cmd)),
    }
}

/// Route admin configuration commands
pub async fn route_config_command(
    cmd: &str,
    _args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "get_config" => route_sync!(serde_json::to_value(state.config.as_ref())
            .map_err(|e| format!("Failed to serialize config: {}", e))),

        "rebuild_indexes" => {
            let rebuilt = with_store(state, submissions::rebuild_indexes).await?;
            route_value!(rebuilt)
        }

        _ => Err(format!("Unknown config command: {}", cmd)),
    }
}

/// Check if a command is a localization command
pub fn is_i18n_command(cmd: &str) -> bool {
    matches!(cmd, "get_messages" | "translate")
}

/// Check if a command is an admin configuration command
pub fn is_config_command(cmd: &str) -> bool {
    matches!(cmd, "get_config" | "rebuild_indexes")
}
