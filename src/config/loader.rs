// Configuration file loading

use super::merger::PartialConfig;
use crate::intake::FieldName;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Intake site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntakeConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Wizard and submission settings
    #[serde(default)]
    pub intake: IntakeSettings,
    /// Localization settings
    #[serde(default)]
    pub i18n: I18nConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3420 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the document store
    #[serde(default = "storage::default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: storage::default_data_dir(),
        }
    }
}

/// Wizard and submission configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSettings {
    /// Fields the store requires on every submission
    #[serde(default)]
    pub required_fields: Vec<FieldName>,
    /// Idle time after which a wizard session is dropped
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Upper bound on a single submission round trip
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
}

fn default_session_ttl() -> u64 { 3600 }
fn default_submit_timeout() -> u64 { 15 }

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            session_ttl_secs: default_session_ttl(),
            submit_timeout_secs: default_submit_timeout(),
        }
    }
}

/// Localization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Locale used when the requested one has no catalog or key
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Directory of `<locale>.toml` files merged over the built-in catalogs
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

fn default_locale() -> String { crate::i18n::DEFAULT_LOCALE.to_string() }

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            catalog_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Config loader
pub struct ConfigLoader {
    /// Config file path
    path: Option<PathBuf>,
    /// Whether the file must exist (set for an explicit `--config`)
    required: bool,
}

impl ConfigLoader {
    /// Loader for the global config file, if it exists
    pub fn new() -> Self {
        Self {
            path: Self::get_global_config_path(),
            required: false,
        }
    }

    /// Loader for an explicit config file, which must exist
    pub fn with_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            required: true,
        }
    }

    /// Get the global config path (`~/.intake-site/config.toml`)
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".intake-site").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the config file as a partial config
    pub fn load(&self) -> Result<Option<PartialConfig>, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() && !self.required {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let partial = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        log::info!("Loaded config from {:?}", path);
        Ok(Some(partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = IntakeConfig::default();
        assert_eq!(config.server.port, 3420);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(config.intake.required_fields.is_empty());
        assert_eq!(config.i18n.default_locale, "en");
        assert!(config.storage.data_dir.ends_with("data"));
    }

    #[test]
    fn test_full_config_round_trip() {
        let config = IntakeConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: IntakeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_global_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader {
            path: Some(temp_dir.path().join("config.toml")),
            required: false,
        };
        assert!(loader.load().unwrap().is_none());
    }

    #[test]
    fn test_load_missing_explicit_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_path(&temp_dir.path().join("nope.toml"));
        assert!(matches!(loader.load(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            ConfigLoader::with_path(&path).load(),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
port = 8080

[intake]
required_fields = ["name", "contactEmail"]
"#,
        )
        .unwrap();

        let partial = ConfigLoader::with_path(&path).load().unwrap().unwrap();
        let server = partial.server.unwrap();
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.bind, None);
        assert_eq!(
            partial.intake.unwrap().required_fields,
            Some(vec![FieldName::Name, FieldName::ContactEmail])
        );
    }
}
