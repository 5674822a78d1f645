//! Server-side document checks
//!
//! Every form field is optional at this boundary. The checks only keep
//! malformed or oversized documents out of the store; stricter rules live
//! in the wizard.

use crate::contact::ContactForm;
use crate::intake::fields::{FieldName, FieldValue, FormValues, PreferredContact, ProjectType, Urgency};
use crate::intake::validation::is_valid_email;

/// Longest text value accepted in any field
pub const MAX_TEXT_CHARS: usize = 5000;

/// Most items accepted in any list field
pub const MAX_LIST_ITEMS: usize = 50;

/// Check a submission document. Returns every problem found, joined.
pub fn check_submission(values: &FormValues, required_fields: &[FieldName]) -> Result<(), String> {
    let mut problems = Vec::new();

    for field in required_fields {
        if !values.is_present(*field) {
            problems.push(format!("{} is required", field));
        }
    }

    for (field, value) in values.iter() {
        if let Some(problem) = check_value(*field, value) {
            problems.push(problem);
        }
    }

    if let Some(email) = values.text(FieldName::ContactEmail) {
        if !is_valid_email(email) {
            problems.push("contactEmail is not a valid email address".to_string());
        }
    }

    if let Some(problem) = check_choice(values, FieldName::ProjectType, |s| {
        s.parse::<ProjectType>().is_ok()
    }) {
        problems.push(problem);
    }
    if let Some(problem) = check_choice(values, FieldName::Urgency, |s| s.parse::<Urgency>().is_ok()) {
        problems.push(problem);
    }
    if let Some(problem) = check_choice(values, FieldName::PreferredContact, |s| {
        PreferredContact::all().iter().any(|c| c.as_str() == s)
    }) {
        problems.push(problem);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

/// Check a contact message document
pub fn check_contact(form: &ContactForm) -> Result<(), String> {
    let mut problems = Vec::new();

    if form.name.trim().is_empty() {
        problems.push("name is required".to_string());
    }
    if form.message.trim().is_empty() {
        problems.push("message is required".to_string());
    }
    if !is_valid_email(&form.email) {
        problems.push("email is not a valid email address".to_string());
    }

    let texts = [
        ("name", Some(form.name.as_str())),
        ("email", Some(form.email.as_str())),
        ("phone", form.phone.as_deref()),
        ("subject", form.subject.as_deref()),
        ("message", Some(form.message.as_str())),
    ];
    for (name, text) in texts {
        if text.map(|t| t.chars().count() > MAX_TEXT_CHARS).unwrap_or(false) {
            problems.push(format!("{} exceeds {} characters", name, MAX_TEXT_CHARS));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

fn check_value(field: FieldName, value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(text) if text.chars().count() > MAX_TEXT_CHARS => Some(format!(
            "{} exceeds {} characters",
            field, MAX_TEXT_CHARS
        )),
        FieldValue::List(items) if items.len() > MAX_LIST_ITEMS => {
            Some(format!("{} has more than {} items", field, MAX_LIST_ITEMS))
        }
        FieldValue::List(items) if items.iter().any(|i| i.chars().count() > MAX_TEXT_CHARS) => {
            Some(format!("{} has an item over {} characters", field, MAX_TEXT_CHARS))
        }
        FieldValue::Number(Some(n)) if !n.is_finite() => Some(format!("{} is not a number", field)),
        _ => None,
    }
}

fn check_choice(
    values: &FormValues,
    field: FieldName,
    is_known: impl Fn(&str) -> bool,
) -> Option<String> {
    match values.get(field) {
        Some(FieldValue::Text(text)) if text.trim().is_empty() => None,
        Some(FieldValue::Text(text)) if is_known(text.trim()) => None,
        Some(FieldValue::Text(text)) => Some(format!("{} has unknown option '{}'", field, text)),
        Some(other) if other.is_empty() => None,
        Some(_) => Some(format!("{} must be text", field)),
        None => None,
    }
}
