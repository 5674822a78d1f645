//! Submission documents
//!
//! One JSON file per submission in `submissions/`, named by id. The form
//! values are stored flat alongside the server-assigned metadata.

use super::index::SubmissionIndexEntry;
use super::lifecycle::{Priority, SubmissionStatus};
use super::{document_path, is_valid_id, new_id, read_json, write_json, FileResult, SUBMISSIONS};
use crate::intake::estimator;
use crate::intake::fields::{FieldName, FormValues};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Id prefix for submissions
pub const ID_PREFIX: &str = "sub";

/// A stored project intake submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub status: SubmissionStatus,
    pub priority: Priority,
    /// Budget estimate computed when the submission was stored
    pub estimated_budget: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub values: FormValues,
}

impl SubmissionRecord {
    /// Create a new record with server-assigned metadata
    pub fn new(values: FormValues) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(ID_PREFIX),
            status: SubmissionStatus::New,
            priority: Priority::from_urgency(values.text(FieldName::Urgency)),
            estimated_budget: estimator::estimate_values(&values),
            assigned_to: None,
            created_at: now,
            updated_at: now,
            values,
        }
    }

    pub fn to_index_entry(&self) -> SubmissionIndexEntry {
        SubmissionIndexEntry {
            id: self.id.clone(),
            name: self.values.text(FieldName::Name).map(String::from),
            project_type: self.values.text(FieldName::ProjectType).map(String::from),
            status: self.status,
            priority: self.priority,
            contact_email: self.values.text(FieldName::ContactEmail).map(String::from),
            assigned_to: self.assigned_to.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Case-insensitive match over the searchable text fields.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        const SEARCHABLE: &[FieldName] = &[
            FieldName::Name,
            FieldName::Description,
            FieldName::Company,
            FieldName::ContactName,
            FieldName::ContactEmail,
            FieldName::Industry,
        ];

        SEARCHABLE.iter().any(|&field| {
            self.values
                .text(field)
                .map(|text| text.to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }
}

/// Filters and paging for submission listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SubmissionQuery {
    pub fn with_status(status: SubmissionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether an index entry passes the filters (paging is ignored)
    pub fn matches(&self, entry: &SubmissionIndexEntry) -> bool {
        self.status.map(|s| s == entry.status).unwrap_or(true)
            && self.priority.map(|p| p == entry.priority).unwrap_or(true)
            && self
                .project_type
                .as_deref()
                .map(|t| entry.project_type.as_deref() == Some(t))
                .unwrap_or(true)
            && self
                .assigned_to
                .as_deref()
                .map(|a| entry.assigned_to.as_deref() == Some(a))
                .unwrap_or(true)
    }

    /// Filter, sort newest first, then page
    pub fn apply(&self, entries: Vec<SubmissionIndexEntry>) -> Vec<SubmissionIndexEntry> {
        let mut matching: Vec<SubmissionIndexEntry> =
            entries.into_iter().filter(|e| self.matches(e)).collect();
        sort_newest_first(&mut matching);

        let offset = self.offset.unwrap_or(0);
        let iter = matching.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

/// Newest first; ties broken by id for a stable order
pub fn sort_newest_first(entries: &mut [SubmissionIndexEntry]) {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Save a submission document
pub fn save_submission_in(data_dir: &Path, record: &SubmissionRecord) -> FileResult<()> {
    write_json(&document_path(data_dir, SUBMISSIONS, &record.id), record)
}

/// Read a submission document. `Ok(None)` when it doesn't exist.
pub fn read_submission_in(data_dir: &Path, id: &str) -> FileResult<Option<SubmissionRecord>> {
    if !is_valid_id(ID_PREFIX, id) {
        return Ok(None);
    }
    let path = document_path(data_dir, SUBMISSIONS, id);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

/// Delete a submission document. Returns whether a file was removed.
pub fn delete_submission_in(data_dir: &Path, id: &str) -> FileResult<bool> {
    if !is_valid_id(ID_PREFIX, id) {
        return Ok(false);
    }
    let path = document_path(data_dir, SUBMISSIONS, id);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path).map_err(|e| format!("Failed to delete submission {}: {}", id, e))?;
    Ok(true)
}
