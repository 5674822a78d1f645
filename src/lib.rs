// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod commands;
pub mod config;
pub mod contact;
pub mod events;
pub mod i18n;
pub mod intake;
pub mod shutdown;
pub mod storage;
mod utils;

// Server module (HTTP/WebSocket API)
pub mod server;

pub use utils::format_amount;

use config::{ConfigError, I18nConfig, IntakeConfig};
use i18n::{I18nError, Translator};
use intake::StoreError;
use server::ServerAppState;
use shutdown::ShutdownState;
use storage::FileDocumentStore;
use thiserror::Error;

/// Failures that keep the site from serving normally.
/// The binary answers these with the fallback page instead of exiting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Message catalogs unusable: {0}")]
    Catalog(#[from] I18nError),

    #[error("Data directory unusable: {0}")]
    Store(#[from] StoreError),
}

/// Build the translator: embedded catalogs plus the optional override directory
pub fn load_translator(config: &I18nConfig) -> Result<Translator, I18nError> {
    let mut translator = Translator::builtin(&config.default_locale)?;
    if let Some(dir) = &config.catalog_dir {
        translator.load_dir(dir)?;
    }
    Ok(translator)
}

/// Open the store and assemble the server state for a loaded configuration
pub fn init_server_state(
    config: IntakeConfig,
    auth_token: String,
    shutdown_state: ShutdownState,
) -> Result<ServerAppState, StartupError> {
    let translator = load_translator(&config.i18n)?;

    let store = FileDocumentStore::open(&config.storage.data_dir)?
        .with_required_fields(config.intake.required_fields.clone());
    store.check_writable()?;

    Ok(ServerAppState::new(
        auth_token,
        config,
        store,
        translator,
        shutdown_state,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_server_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = IntakeConfig::default();
        config.storage.data_dir = temp_dir.path().join("data");

        let state =
            init_server_state(config, "token".to_string(), ShutdownState::new()).unwrap();
        assert_eq!(state.auth_token, "token");
        assert!(state.store.data_dir().ends_with("data"));
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_init_rejects_unknown_default_locale() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = IntakeConfig::default();
        config.storage.data_dir = temp_dir.path().to_path_buf();
        config.i18n.default_locale = "fr".to_string();

        let result = init_server_state(config, "token".to_string(), ShutdownState::new());
        assert!(matches!(result, Err(StartupError::Catalog(_))));
    }

    #[test]
    fn test_load_translator_with_override_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("en.toml"),
            "[contact]\ntitle = \"Say hello\"\n",
        )
        .unwrap();

        let config = I18nConfig {
            default_locale: "en".to_string(),
            catalog_dir: Some(temp_dir.path().to_path_buf()),
        };
        let translator = load_translator(&config).unwrap();
        assert_eq!(
            translator.t(None, "contact.title", &Default::default()),
            "Say hello"
        );
    }
}
