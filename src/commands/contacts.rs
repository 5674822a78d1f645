// Contact form commands (public submit, admin management)

use crate::contact::{self, ContactError, ContactErrors, ContactForm};
use crate::storage::index::ContactIndexEntry;
use crate::storage::{ContactRecord, ContactStatus, FileDocumentStore};
use crate::utils::ResultExt;
use serde::Serialize;

/// Result of a contact form submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ContactSubmission {
    /// Stored; the client shows `contact.success`
    Sent { id: String },
    /// Not stored; field errors carry message keys
    Invalid {
        #[serde(rename = "invalidFields")]
        invalid_fields: ContactErrors,
    },
}

/// Validate and store a contact message.
/// Field errors are a normal response; only store failures are errors.
pub fn submit_contact_form(
    store: &FileDocumentStore,
    form: &ContactForm,
) -> Result<ContactSubmission, String> {
    match contact::submit_contact(store, form) {
        Ok(id) => Ok(ContactSubmission::Sent { id }),
        Err(ContactError::Invalid(invalid_fields)) => {
            Ok(ContactSubmission::Invalid { invalid_fields })
        }
        Err(ContactError::Store(e)) => Err(format!("Failed to store contact message: {}", e)),
    }
}

pub fn list_contacts(
    store: &FileDocumentStore,
    status: Option<ContactStatus>,
) -> Result<Vec<ContactIndexEntry>, String> {
    store.list_contacts(status).with_context("Failed to list contact messages")
}

pub fn get_contact(store: &FileDocumentStore, id: &str) -> Result<ContactRecord, String> {
    store.get_contact(id).with_context("Failed to load contact message")
}

pub fn count_contacts(
    store: &FileDocumentStore,
    status: Option<ContactStatus>,
) -> Result<usize, String> {
    store.count_contacts(status).with_context("Failed to count contact messages")
}

/// Update contact status, returning the record and the status it left
pub fn update_contact_status_internal(
    store: &FileDocumentStore,
    id: &str,
    status: ContactStatus,
) -> Result<(ContactRecord, ContactStatus), String> {
    let old_status = get_contact(store, id)?.status;
    let record = store
        .update_contact_status(id, status)
        .with_context("Failed to update contact status")?;
    Ok((record, old_status))
}

pub fn delete_contact(store: &FileDocumentStore, id: &str) -> Result<(), String> {
    store.delete_contact(id).with_context("Failed to delete contact message")
}
