//! Contact form
//!
//! A short standalone form beside the intake wizard. It shares the email and
//! phone rules with the wizard and persists into the `contacts` collection.

use crate::intake::validation::{
    check_length, is_valid_email, is_valid_phone, ValidationResult, KEY_INVALID_EMAIL,
    KEY_INVALID_PHONE, KEY_REQUIRED,
};
use crate::intake::StoreError;
use crate::storage::FileDocumentStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fields of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Subject,
    Message,
}

/// Contact form as submitted by the site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
}

pub type ContactErrors = BTreeMap<ContactField, ValidationResult>;

impl ContactForm {
    /// Validate every field, returning only the invalid ones
    pub fn validate(&self) -> ContactErrors {
        let mut errors = ContactErrors::new();

        let name = required(&self.name).unwrap_or_else(|| check_length(&self.name, 2, 100));
        record(&mut errors, ContactField::Name, name);

        let email = required(&self.email).unwrap_or_else(|| {
            if is_valid_email(&self.email) {
                ValidationResult::ok()
            } else {
                ValidationResult::invalid(KEY_INVALID_EMAIL)
            }
        });
        record(&mut errors, ContactField::Email, email);

        if let Some(phone) = non_blank(&self.phone) {
            if !is_valid_phone(phone) {
                record(
                    &mut errors,
                    ContactField::Phone,
                    ValidationResult::invalid(KEY_INVALID_PHONE),
                );
            }
        }

        if let Some(subject) = non_blank(&self.subject) {
            record(&mut errors, ContactField::Subject, check_length(subject, 0, 200));
        }

        let message =
            required(&self.message).unwrap_or_else(|| check_length(&self.message, 10, 5000));
        record(&mut errors, ContactField::Message, message);

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("contact form has {} invalid field(s)", .0.len())]
    Invalid(ContactErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate then persist a contact message, returning the new id
pub fn submit_contact(store: &FileDocumentStore, form: &ContactForm) -> Result<String, ContactError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(ContactError::Invalid(errors));
    }

    let record = store.create_contact(form)?;
    log::info!("Contact message stored: {}", record.id);
    Ok(record.id)
}

fn required(value: &str) -> Option<ValidationResult> {
    if value.trim().is_empty() {
        Some(ValidationResult::invalid(KEY_REQUIRED))
    } else {
        None
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn record(errors: &mut ContactErrors, field: ContactField, result: ValidationResult) {
    if !result.valid {
        errors.insert(field, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: Some("+14155550100".to_string()),
            subject: Some("Timeline".to_string()),
            message: "When could you start on a new site?".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(valid_form().is_valid());
    }

    #[test]
    fn test_required_fields() {
        let errors = ContactForm::default().validate();
        assert_eq!(errors.len(), 3);
        for field in [ContactField::Name, ContactField::Email, ContactField::Message] {
            assert_eq!(errors[&field].message_key.as_deref(), Some(KEY_REQUIRED));
        }
    }

    #[test]
    fn test_field_rules() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        form.phone = Some("555-0100".to_string());
        form.message = "hi".to_string();

        let errors = form.validate();
        assert!(errors.contains_key(&ContactField::Email));
        assert!(errors.contains_key(&ContactField::Phone));
        assert!(errors.contains_key(&ContactField::Message));
        assert!(!errors.contains_key(&ContactField::Name));
    }

    #[test]
    fn test_blank_optionals_are_fine() {
        let mut form = valid_form();
        form.phone = Some("  ".to_string());
        form.subject = None;
        assert!(form.is_valid());
    }

    #[test]
    fn test_submit_contact() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDocumentStore::open(temp_dir.path()).unwrap();

        let id = submit_contact(&store, &valid_form()).unwrap();
        assert!(id.starts_with("msg_"));
        assert_eq!(store.count_contacts(None).unwrap(), 1);

        let result = submit_contact(&store, &ContactForm::default());
        assert!(matches!(result, Err(ContactError::Invalid(_))));
        assert_eq!(store.count_contacts(None).unwrap(), 1);
    }
}
