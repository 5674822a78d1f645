// Message catalogs and lookup with locale fallback
//
// Lookup order:
// 1. Requested locale (a region suffix like `es-MX` falls back to `es`)
// 2. Default locale
// 3. The key itself
//
// Catalogs are TOML; nested tables flatten into dotted keys, so
// `[validation] required = "..."` answers `validation.required`.

use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Catalogs compiled into the binary
const BUILTIN_CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.toml")),
    ("es", include_str!("../../locales/es.toml")),
];

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("Failed to parse catalog '{locale}': {source}")]
    Parse {
        locale: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read catalog directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No catalog for default locale '{0}'")]
    UnknownDefaultLocale(String),
}

type Catalog = HashMap<String, String>;

/// Translates message keys into display text
#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: HashMap<String, Catalog>,
    default_locale: String,
}

impl Translator {
    /// Translator over the built-in catalogs
    pub fn builtin(default_locale: &str) -> Result<Self, I18nError> {
        let mut translator = Self {
            catalogs: HashMap::new(),
            default_locale: default_locale.to_string(),
        };
        for (locale, source) in BUILTIN_CATALOGS {
            translator.add_catalog(locale, source)?;
        }
        translator.ensure_default()?;
        Ok(translator)
    }

    /// Merge a TOML catalog into a locale; later entries win
    pub fn add_catalog(&mut self, locale: &str, source: &str) -> Result<(), I18nError> {
        let table: toml::Table = source.parse().map_err(|e| I18nError::Parse {
            locale: locale.to_string(),
            source: e,
        })?;

        let catalog = self.catalogs.entry(locale.to_string()).or_default();
        flatten_into(catalog, "", &toml::Value::Table(table));
        debug!("Loaded catalog '{}' ({} keys)", locale, catalog.len());
        Ok(())
    }

    /// Merge every `<locale>.toml` file of a directory over the current catalogs
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, I18nError> {
        let io_err = |source| I18nError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut loaded = 0;
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(io_err)?;
            self.add_catalog(locale, &source)?;
            loaded += 1;
        }

        info!("Loaded {} catalog override(s) from {:?}", loaded, dir);
        Ok(loaded)
    }

    fn ensure_default(&self) -> Result<(), I18nError> {
        if self.catalogs.contains_key(&self.default_locale) {
            Ok(())
        } else {
            Err(I18nError::UnknownDefaultLocale(self.default_locale.clone()))
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Known locales, sorted
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Catalog locale to use for a requested locale
    pub fn resolve_locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
            return &self.default_locale;
        };
        if self.catalogs.contains_key(requested) {
            return requested;
        }
        let language = requested.split(['-', '_']).next().unwrap_or(requested);
        if self.catalogs.contains_key(language) {
            return language;
        }
        &self.default_locale
    }

    /// Translate a key, interpolating `{name}` placeholders from `params`
    pub fn t(&self, locale: Option<&str>, key: &str, params: &BTreeMap<String, String>) -> String {
        let locale = self.resolve_locale(locale);
        let template = self
            .lookup(locale, key)
            .or_else(|| self.lookup(&self.default_locale, key));

        match template {
            Some(template) => interpolate(template, params),
            None => {
                debug!("Missing message key '{}' for locale '{}'", key, locale);
                key.to_string()
            }
        }
    }

    /// Every message for a locale, default-locale entries filling the gaps
    pub fn messages(&self, locale: Option<&str>) -> BTreeMap<String, String> {
        let locale = self.resolve_locale(locale);
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        for source in [self.default_locale.as_str(), locale] {
            if let Some(catalog) = self.catalogs.get(source) {
                merged.extend(catalog.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        merged
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(locale)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

fn flatten_into(catalog: &mut Catalog, prefix: &str, value: &toml::Value) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(catalog, &path, child);
            }
        }
        toml::Value::String(text) => {
            catalog.insert(prefix.to_string(), text.clone());
        }
        other => {
            catalog.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Replace `{name}` placeholders; unknown placeholders are left as-is
pub fn interpolate(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut output = template.to_string();
    for (name, value) in params {
        output = output.replace(&format!("{{{}}}", name), value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{FieldName, WizardStep};
    use tempfile::TempDir;

    fn no_params() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_builtin_catalogs_load() {
        let translator = Translator::builtin("en").unwrap();
        assert_eq!(translator.locales(), vec!["en", "es"]);
        assert_eq!(translator.default_locale(), "en");
    }

    #[test]
    fn test_unknown_default_locale() {
        assert!(matches!(
            Translator::builtin("fr"),
            Err(I18nError::UnknownDefaultLocale(_))
        ));
    }

    #[test]
    fn test_fallback_chain() {
        let mut translator = Translator::builtin("en").unwrap();
        translator
            .add_catalog("en", "[only]\nenglish = \"Only in English\"")
            .unwrap();

        assert_ne!(
            translator.t(Some("es"), "validation.required", &no_params()),
            translator.t(Some("en"), "validation.required", &no_params())
        );
        assert_eq!(
            translator.t(Some("es"), "only.english", &no_params()),
            "Only in English"
        );
        assert_eq!(
            translator.t(Some("es"), "no.such.key", &no_params()),
            "no.such.key"
        );
    }

    #[test]
    fn test_region_locale_resolves_to_language() {
        let translator = Translator::builtin("en").unwrap();
        assert_eq!(translator.resolve_locale(Some("es-MX")), "es");
        assert_eq!(translator.resolve_locale(Some("de")), "en");
        assert_eq!(translator.resolve_locale(None), "en");
    }

    #[test]
    fn test_interpolation() {
        let translator = Translator::builtin("en").unwrap();
        let mut params = BTreeMap::new();
        params.insert("min".to_string(), "2".to_string());
        let text = translator.t(Some("en"), "validation.tooShort", &params);
        assert!(text.contains('2'));
        assert!(!text.contains("{min}"));
    }

    #[test]
    fn test_every_wizard_key_is_translated() {
        let translator = Translator::builtin("en").unwrap();
        for locale in ["en", "es"] {
            let catalog = &translator.catalogs[locale];
            for step in WizardStep::all() {
                assert!(catalog.contains_key(&step.title_key()), "{} {:?}", locale, step);
                assert!(catalog.contains_key(&step.description_key()));
            }
            for field in FieldName::all() {
                assert!(catalog.contains_key(&field.label_key()), "{} {}", locale, field);
            }
        }
    }

    #[test]
    fn test_load_dir_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("en.toml"),
            "[validation]\nrequired = \"Please fill this in\"",
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut translator = Translator::builtin("en").unwrap();
        assert_eq!(translator.load_dir(temp_dir.path()).unwrap(), 1);
        assert_eq!(
            translator.t(None, "validation.required", &no_params()),
            "Please fill this in"
        );
    }

    #[test]
    fn test_messages_merge_default() {
        let mut translator = Translator::builtin("en").unwrap();
        translator.add_catalog("en", "extra = \"x\"").unwrap();
        let messages = translator.messages(Some("es"));
        assert_eq!(messages.get("extra").map(String::as_str), Some("x"));
        assert_eq!(
            messages.get("validation.required"),
            translator.catalogs["es"].get("validation.required")
        );
    }
}
