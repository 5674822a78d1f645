//! Field validation rules
//!
//! One canonical rule per field. Validation never fails with an error:
//! an invalid value yields a result carrying a message key that the
//! localization layer turns into display text.

use super::fields::{FieldName, FieldValue, FormValues};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const KEY_REQUIRED: &str = "validation.required";
pub const KEY_TOO_SHORT: &str = "validation.tooShort";
pub const KEY_TOO_LONG: &str = "validation.tooLong";
pub const KEY_INVALID_URL: &str = "validation.invalidUrl";
pub const KEY_INVALID_EMAIL: &str = "validation.invalidEmail";
pub const KEY_INVALID_PHONE: &str = "validation.invalidPhone";
pub const KEY_INVALID_OPTION: &str = "validation.invalidOption";
pub const KEY_TOO_MANY_ITEMS: &str = "validation.tooManyItems";
pub const KEY_ITEM_TOO_LONG: &str = "validation.itemTooLong";
pub const KEY_INVALID_NUMBER: &str = "validation.invalidNumber";
pub const KEY_WRONG_KIND: &str = "validation.wrongKind";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
static PHONE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").unwrap())
}

fn phone_pattern() -> &'static Regex {
    PHONE_PATTERN.get_or_init(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").unwrap())
}

/// Outcome of validating a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_key: Option<String>,
    /// Interpolation parameters for the message (e.g. `min`, `max`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message_key: None,
            params: BTreeMap::new(),
        }
    }

    pub fn invalid(message_key: &str) -> Self {
        Self {
            valid: false,
            message_key: Some(message_key.to_string()),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }
}

/// Invalid fields keyed by name
pub type InvalidFields = BTreeMap<FieldName, ValidationResult>;

/// Shape rule attached to a field
#[derive(Debug, Clone, Copy)]
enum Rule {
    Length { min: usize, max: usize },
    Url,
    Email,
    Phone,
    Choice(&'static [&'static str]),
    List { max_items: usize, max_item_len: usize },
    TextOrAmount { max: usize },
}

/// Rule set for one field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    required: bool,
    rule: Rule,
}

impl FieldRule {
    pub fn is_required(&self) -> bool {
        self.required
    }
}

const PROJECT_TYPES: &[&str] = &[
    "website-redesign",
    "new-website",
    "ecommerce",
    "web-app",
    "mobile-app",
    "branding",
];
const URGENCIES: &[&str] = &["low", "medium", "high", "urgent"];
const CONTACT_CHANNELS: &[&str] = &["email", "phone", "any"];

/// The canonical rule for a field
pub fn rule_for(field: FieldName) -> FieldRule {
    let (required, rule) = match field {
        FieldName::Name => (true, Rule::Length { min: 2, max: 100 }),
        FieldName::Description => (true, Rule::Length { min: 10, max: 1000 }),
        FieldName::ProjectType => (true, Rule::Choice(PROJECT_TYPES)),
        FieldName::Urgency => (false, Rule::Choice(URGENCIES)),
        FieldName::Industry => (false, Rule::Length { min: 2, max: 100 }),
        FieldName::TargetAudience => (false, Rule::Length { min: 2, max: 500 }),
        FieldName::ExistingWebsite => (false, Rule::Url),
        FieldName::Goals => (
            false,
            Rule::List {
                max_items: 10,
                max_item_len: 200,
            },
        ),
        FieldName::Features => (
            false,
            Rule::List {
                max_items: 20,
                max_item_len: 100,
            },
        ),
        FieldName::Timeline => (false, Rule::Length { min: 0, max: 100 }),
        FieldName::Budget => (false, Rule::TextOrAmount { max: 100 }),
        FieldName::HasContent => (false, Rule::Length { min: 0, max: 100 }),
        FieldName::DesignPreferences => (false, Rule::Length { min: 0, max: 1000 }),
        FieldName::ContactName => (false, Rule::Length { min: 2, max: 100 }),
        FieldName::ContactEmail => (true, Rule::Email),
        FieldName::ContactPhone => (false, Rule::Phone),
        FieldName::Company => (false, Rule::Length { min: 0, max: 100 }),
        FieldName::PreferredContact => (false, Rule::Choice(CONTACT_CHANNELS)),
        FieldName::AdditionalInfo => (false, Rule::Length { min: 0, max: 2000 }),
        FieldName::ProjectFiles => (
            false,
            Rule::List {
                max_items: 10,
                max_item_len: 500,
            },
        ),
    };
    FieldRule { required, rule }
}

/// Validate one field value. `None` means the field was never filled in.
pub fn validate(field: FieldName, value: Option<&FieldValue>) -> ValidationResult {
    let rule = rule_for(field);

    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            return if rule.required {
                ValidationResult::invalid(KEY_REQUIRED)
            } else {
                ValidationResult::ok()
            };
        }
    };

    match (rule.rule, value) {
        (Rule::Length { min, max }, FieldValue::Text(text)) => check_length(text, min, max),
        (Rule::Url, FieldValue::Text(text)) => check_pattern(text, url_pattern(), KEY_INVALID_URL),
        (Rule::Email, FieldValue::Text(text)) => {
            check_pattern(text, email_pattern(), KEY_INVALID_EMAIL)
        }
        (Rule::Phone, FieldValue::Text(text)) => {
            check_pattern(text, phone_pattern(), KEY_INVALID_PHONE)
        }
        (Rule::Choice(options), FieldValue::Text(text)) => {
            if options.contains(&text.trim()) {
                ValidationResult::ok()
            } else {
                ValidationResult::invalid(KEY_INVALID_OPTION)
            }
        }
        (
            Rule::List {
                max_items,
                max_item_len,
            },
            FieldValue::List(items),
        ) => check_list(items, max_items, max_item_len),
        (Rule::TextOrAmount { max }, FieldValue::Text(text)) => check_length(text, 0, max),
        (Rule::TextOrAmount { .. }, FieldValue::Number(Some(amount))) => {
            if amount.is_finite() && *amount >= 0.0 {
                ValidationResult::ok()
            } else {
                ValidationResult::invalid(KEY_INVALID_NUMBER)
            }
        }
        _ => ValidationResult::invalid(KEY_WRONG_KIND),
    }
}

/// Validate a field as it currently stands in a set of form values
pub fn validate_in(values: &FormValues, field: FieldName) -> ValidationResult {
    validate(field, values.get(field))
}

/// Validate the given fields, returning only the invalid ones
pub fn validate_fields(values: &FormValues, fields: &[FieldName]) -> InvalidFields {
    fields
        .iter()
        .map(|&field| (field, validate_in(values, field)))
        .filter(|(_, result)| !result.valid)
        .collect()
}

/// Validate every field of the form
pub fn validate_all(values: &FormValues) -> InvalidFields {
    validate_fields(values, FieldName::all())
}

/// Standalone email check, shared with the contact form and the store
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// Standalone phone check, shared with the contact form
pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone.trim())
}

/// Length check on trimmed text, counted in characters
pub fn check_length(text: &str, min: usize, max: usize) -> ValidationResult {
    let len = text.trim().chars().count();
    if len < min {
        ValidationResult::invalid(KEY_TOO_SHORT).with_param("min", min)
    } else if len > max {
        ValidationResult::invalid(KEY_TOO_LONG).with_param("max", max)
    } else {
        ValidationResult::ok()
    }
}

fn check_pattern(text: &str, pattern: &Regex, key: &str) -> ValidationResult {
    if pattern.is_match(text.trim()) {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid(key)
    }
}

fn check_list(items: &[String], max_items: usize, max_item_len: usize) -> ValidationResult {
    if items.len() > max_items {
        return ValidationResult::invalid(KEY_TOO_MANY_ITEMS).with_param("limit", max_items);
    }
    if items
        .iter()
        .any(|item| item.trim().chars().count() > max_item_len)
    {
        return ValidationResult::invalid(KEY_ITEM_TOO_LONG).with_param("max", max_item_len);
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::fields::{PreferredContact, ProjectType, Urgency};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_choice_tables_match_enums() {
        let types: Vec<&str> = ProjectType::all().iter().map(|t| t.as_str()).collect();
        let urgencies: Vec<&str> = Urgency::all().iter().map(|u| u.as_str()).collect();
        let channels: Vec<&str> = PreferredContact::all().iter().map(|c| c.as_str()).collect();
        assert_eq!(types, PROJECT_TYPES);
        assert_eq!(urgencies, URGENCIES);
        assert_eq!(channels, CONTACT_CHANNELS);
    }

    #[test]
    fn test_email_rule() {
        let bad = validate(FieldName::ContactEmail, Some(&text("not-an-email")));
        assert!(!bad.valid);
        assert_eq!(bad.message_key.as_deref(), Some(KEY_INVALID_EMAIL));

        assert!(validate(FieldName::ContactEmail, Some(&text("a@b.com"))).valid);
        assert!(!validate(FieldName::ContactEmail, Some(&text("a@@b.com"))).valid);
        assert!(!validate(FieldName::ContactEmail, Some(&text("a b@c.com"))).valid);
        assert!(!validate(FieldName::ContactEmail, Some(&text("a@bcom"))).valid);
    }

    #[test]
    fn test_required_field_missing() {
        let result = validate(FieldName::Name, None);
        assert!(!result.valid);
        assert_eq!(result.message_key.as_deref(), Some(KEY_REQUIRED));

        let blank = validate(FieldName::Name, Some(&text("   ")));
        assert_eq!(blank.message_key.as_deref(), Some(KEY_REQUIRED));
    }

    #[test]
    fn test_optional_field_missing_is_valid() {
        assert!(validate(FieldName::Industry, None).valid);
        assert!(validate(FieldName::ExistingWebsite, Some(&text(""))).valid);
        assert!(validate(FieldName::ContactPhone, Some(&text(""))).valid);
    }

    #[test]
    fn test_length_bounds_use_trimmed_chars() {
        let short = validate(FieldName::Name, Some(&text(" A ")));
        assert_eq!(short.message_key.as_deref(), Some(KEY_TOO_SHORT));
        assert_eq!(short.params.get("min").map(String::as_str), Some("2"));

        assert!(validate(FieldName::Name, Some(&text("  Al  "))).valid);
        assert!(validate(FieldName::Name, Some(&text(&"é".repeat(100)))).valid);

        let long = validate(FieldName::Name, Some(&text(&"x".repeat(101))));
        assert_eq!(long.message_key.as_deref(), Some(KEY_TOO_LONG));
    }

    #[test]
    fn test_description_bounds() {
        assert!(!validate(FieldName::Description, Some(&text("too short"))).valid);
        assert!(validate(FieldName::Description, Some(&text("Ten chars!"))).valid);
    }

    #[test]
    fn test_url_rule() {
        assert!(validate(FieldName::ExistingWebsite, Some(&text("https://acme.test"))).valid);
        assert!(validate(FieldName::ExistingWebsite, Some(&text("HTTP://acme.test/shop"))).valid);
        assert!(!validate(FieldName::ExistingWebsite, Some(&text("acme.test"))).valid);
        assert!(!validate(FieldName::ExistingWebsite, Some(&text("ftp://acme.test"))).valid);
    }

    #[test]
    fn test_phone_rule() {
        assert!(validate(FieldName::ContactPhone, Some(&text("+14155550100"))).valid);
        assert!(validate(FieldName::ContactPhone, Some(&text("7"))).valid);
        assert!(!validate(FieldName::ContactPhone, Some(&text("0123456"))).valid);
        assert!(validate(FieldName::ContactPhone, Some(&text("+1234567890123456"))).valid);
        assert!(!validate(FieldName::ContactPhone, Some(&text("+12345678901234567"))).valid);
        assert!(!validate(FieldName::ContactPhone, Some(&text("555-0100"))).valid);
    }

    #[test]
    fn test_choice_rule() {
        assert!(validate(FieldName::ProjectType, Some(&text("web-app"))).valid);
        let bad = validate(FieldName::ProjectType, Some(&text("spaceship")));
        assert_eq!(bad.message_key.as_deref(), Some(KEY_INVALID_OPTION));
        assert!(!validate(FieldName::Urgency, Some(&text("flexible"))).valid);
    }

    #[test]
    fn test_list_rule() {
        let many = FieldValue::List((0..11).map(|i| format!("goal {}", i)).collect());
        let result = validate(FieldName::Goals, Some(&many));
        assert_eq!(result.message_key.as_deref(), Some(KEY_TOO_MANY_ITEMS));

        let ok = FieldValue::List(vec!["cms".to_string(), "analytics".to_string()]);
        assert!(validate(FieldName::Features, Some(&ok)).valid);
    }

    #[test]
    fn test_wrong_kind() {
        let result = validate(FieldName::Name, Some(&FieldValue::List(vec!["x".into()])));
        assert_eq!(result.message_key.as_deref(), Some(KEY_WRONG_KIND));
    }

    #[test]
    fn test_budget_accepts_text_or_amount() {
        assert!(validate(FieldName::Budget, Some(&text("10k-20k"))).valid);
        assert!(validate(FieldName::Budget, Some(&FieldValue::Number(Some(15000.0)))).valid);
        assert!(!validate(FieldName::Budget, Some(&FieldValue::Number(Some(-1.0)))).valid);
        assert!(validate(FieldName::Budget, Some(&FieldValue::Number(None))).valid);
    }

    #[test]
    fn test_validate_fields_only_reports_invalid() {
        let values = FormValues::new()
            .with(FieldName::Name, "Acme Redo")
            .with(FieldName::ContactEmail, "nope");
        let invalid = validate_fields(
            &values,
            &[FieldName::Name, FieldName::ContactEmail, FieldName::Description],
        );
        assert_eq!(invalid.len(), 2);
        assert!(invalid.contains_key(&FieldName::ContactEmail));
        assert!(invalid.contains_key(&FieldName::Description));
    }
}
