// Layered configuration system

pub mod loader;
pub mod merger;

pub use loader::{ConfigError, ConfigLoader, I18nConfig, IntakeConfig, IntakeSettings, ServerConfig};
pub use merger::{ConfigMerger, PartialConfig, PartialServerConfig, PartialStorageConfig};

use std::path::Path;

/// Load and merge configuration from all sources
/// Priority: CLI -> config file -> defaults
///
/// With `config_path` the file must exist; otherwise the global
/// `~/.intake-site/config.toml` is used when present.
pub fn load_merged_config(
    config_path: Option<&Path>,
    cli_overrides: Option<PartialConfig>,
) -> Result<IntakeConfig, ConfigError> {
    let loader = match config_path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };

    let file = loader.load()?;

    Ok(ConfigMerger::new()
        .with_file(file)
        .with_cli(cli_overrides)
        .merge())
}
