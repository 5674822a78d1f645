// Configuration merging with priority

use super::loader::{I18nConfig, IntakeConfig, IntakeSettings, ServerConfig, StorageConfig};
use crate::intake::FieldName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Partial configuration for merging
/// Uses Option<T> for all fields to support partial overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialConfig {
    #[serde(default)]
    pub server: Option<PartialServerConfig>,
    #[serde(default)]
    pub storage: Option<PartialStorageConfig>,
    #[serde(default)]
    pub intake: Option<PartialIntakeSettings>,
    #[serde(default)]
    pub i18n: Option<PartialI18nConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialStorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialIntakeSettings {
    pub required_fields: Option<Vec<FieldName>>,
    pub session_ttl_secs: Option<u64>,
    pub submit_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialI18nConfig {
    pub default_locale: Option<String>,
    pub catalog_dir: Option<PathBuf>,
}

/// Configuration merger
/// Priority order: CLI -> File -> Defaults
pub struct ConfigMerger {
    defaults: IntakeConfig,
    file: Option<PartialConfig>,
    cli: Option<PartialConfig>,
}

impl ConfigMerger {
    /// Create a new config merger with defaults
    pub fn new() -> Self {
        Self {
            defaults: IntakeConfig::default(),
            file: None,
            cli: None,
        }
    }

    /// Set config file values
    pub fn with_file(mut self, config: Option<PartialConfig>) -> Self {
        self.file = config;
        self
    }

    /// Set CLI overrides
    pub fn with_cli(mut self, config: Option<PartialConfig>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all configs with priority
    pub fn merge(&self) -> IntakeConfig {
        let mut result = self.defaults.clone();

        if let Some(ref file) = self.file {
            result = merge_partial(&result, file);
        }

        // CLI overrides (highest priority)
        if let Some(ref cli) = self.cli {
            result = merge_partial(&result, cli);
        }

        result
    }
}

/// Merge partial config into full config
fn merge_partial(base: &IntakeConfig, partial: &PartialConfig) -> IntakeConfig {
    IntakeConfig {
        server: partial
            .server
            .as_ref()
            .map(|p| merge_server(&base.server, p))
            .unwrap_or_else(|| base.server.clone()),
        storage: partial
            .storage
            .as_ref()
            .map(|p| merge_storage(&base.storage, p))
            .unwrap_or_else(|| base.storage.clone()),
        intake: partial
            .intake
            .as_ref()
            .map(|p| merge_intake(&base.intake, p))
            .unwrap_or_else(|| base.intake.clone()),
        i18n: partial
            .i18n
            .as_ref()
            .map(|p| merge_i18n(&base.i18n, p))
            .unwrap_or_else(|| base.i18n.clone()),
    }
}

fn merge_server(base: &ServerConfig, partial: &PartialServerConfig) -> ServerConfig {
    ServerConfig {
        bind: partial.bind.clone().unwrap_or_else(|| base.bind.clone()),
        port: partial.port.unwrap_or(base.port),
        cors_origins: partial
            .cors_origins
            .clone()
            .unwrap_or_else(|| base.cors_origins.clone()),
    }
}

fn merge_storage(base: &StorageConfig, partial: &PartialStorageConfig) -> StorageConfig {
    StorageConfig {
        data_dir: partial
            .data_dir
            .clone()
            .unwrap_or_else(|| base.data_dir.clone()),
    }
}

fn merge_intake(base: &IntakeSettings, partial: &PartialIntakeSettings) -> IntakeSettings {
    IntakeSettings {
        required_fields: partial
            .required_fields
            .clone()
            .unwrap_or_else(|| base.required_fields.clone()),
        session_ttl_secs: partial.session_ttl_secs.unwrap_or(base.session_ttl_secs),
        submit_timeout_secs: partial
            .submit_timeout_secs
            .unwrap_or(base.submit_timeout_secs),
    }
}

fn merge_i18n(base: &I18nConfig, partial: &PartialI18nConfig) -> I18nConfig {
    I18nConfig {
        default_locale: partial
            .default_locale
            .clone()
            .unwrap_or_else(|| base.default_locale.clone()),
        catalog_dir: partial
            .catalog_dir
            .clone()
            .or_else(|| base.catalog_dir.clone()),
    }
}
