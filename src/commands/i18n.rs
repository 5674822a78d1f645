// Localization commands

use crate::i18n::Translator;
use serde::Serialize;
use std::collections::BTreeMap;

/// A full message catalog for one locale
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCatalog {
    /// Locale the catalog was resolved to (may differ from the request)
    pub locale: String,
    pub available_locales: Vec<String>,
    pub messages: BTreeMap<String, String>,
}

pub fn get_messages(translator: &Translator, locale: Option<&str>) -> MessageCatalog {
    MessageCatalog {
        locale: translator.resolve_locale(locale).to_string(),
        available_locales: translator.locales().into_iter().map(String::from).collect(),
        messages: translator.messages(locale),
    }
}

pub fn translate(
    translator: &Translator,
    locale: Option<&str>,
    key: &str,
    params: Option<BTreeMap<String, String>>,
) -> String {
    translator.t(locale, key, &params.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_messages_resolves_region() {
        let translator = Translator::builtin("en").unwrap();
        let catalog = get_messages(&translator, Some("es-MX"));
        assert_eq!(catalog.locale, "es");
        assert_eq!(catalog.available_locales, vec!["en", "es"]);
        assert!(catalog.messages.contains_key("validation.required"));
    }

    #[test]
    fn test_translate_with_params() {
        let translator = Translator::builtin("en").unwrap();
        let mut params = BTreeMap::new();
        params.insert("min".to_string(), "2".to_string());

        let text = translate(&translator, None, "validation.tooShort", Some(params));
        assert!(text.contains('2'));
        assert!(!text.contains("{min}"));

        assert_eq!(translate(&translator, None, "no.such.key", None), "no.such.key");
    }
}
