//! Contact message documents

use super::index::ContactIndexEntry;
use super::{document_path, is_valid_id, new_id, read_json, write_json, FileResult, CONTACTS};
use crate::contact::ContactForm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Id prefix for contact messages
pub const ID_PREFIX: &str = "msg";

/// Handling status of a contact message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Read,
    Replied,
    Archived,
}

impl ContactStatus {
    pub fn all() -> &'static [ContactStatus] {
        &[
            ContactStatus::New,
            ContactStatus::Read,
            ContactStatus::Replied,
            ContactStatus::Archived,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContactStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown contact status: {}", s))
    }
}

/// A stored contact message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactRecord {
    /// Build a record from a submitted form, trimming every value
    pub fn from_form(form: &ContactForm) -> Self {
        let now = Utc::now();
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            id: new_id(ID_PREFIX),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: optional(&form.phone),
            subject: optional(&form.subject),
            message: form.message.trim().to_string(),
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_index_entry(&self) -> ContactIndexEntry {
        ContactIndexEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Save a contact document
pub fn save_contact_in(data_dir: &Path, record: &ContactRecord) -> FileResult<()> {
    write_json(&document_path(data_dir, CONTACTS, &record.id), record)
}

/// Read a contact document. `Ok(None)` when it doesn't exist.
pub fn read_contact_in(data_dir: &Path, id: &str) -> FileResult<Option<ContactRecord>> {
    if !is_valid_id(ID_PREFIX, id) {
        return Ok(None);
    }
    let path = document_path(data_dir, CONTACTS, id);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

/// Delete a contact document. Returns whether a file was removed.
pub fn delete_contact_in(data_dir: &Path, id: &str) -> FileResult<bool> {
    if !is_valid_id(ID_PREFIX, id) {
        return Ok(false);
    }
    let path = document_path(data_dir, CONTACTS, id);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path).map_err(|e| format!("Failed to delete contact {}: {}", id, e))?;
    Ok(true)
}
