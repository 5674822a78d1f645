// Admin commands for stored submissions
// Event emission is handled by the proxy layer

use crate::storage::index::SubmissionIndexEntry;
use crate::storage::lifecycle::valid_next_statuses;
use crate::storage::store::IndexRebuild;
use crate::storage::{FileDocumentStore, SubmissionQuery, SubmissionRecord, SubmissionStatus};
use crate::utils::ResultExt;
use serde::Serialize;

/// A submission together with the statuses it may move to next
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub record: SubmissionRecord,
    pub next_statuses: Vec<SubmissionStatus>,
}

pub fn list_submissions(
    store: &FileDocumentStore,
    query: &SubmissionQuery,
) -> Result<Vec<SubmissionIndexEntry>, String> {
    store.list_submissions(query).with_context("Failed to list submissions")
}

pub fn get_submission(store: &FileDocumentStore, id: &str) -> Result<SubmissionDetail, String> {
    let record = store.get_submission(id).with_context("Failed to load submission")?;
    Ok(SubmissionDetail {
        next_statuses: valid_next_statuses(record.status),
        record,
    })
}

pub fn count_submissions(store: &FileDocumentStore, query: &SubmissionQuery) -> Result<usize, String> {
    store.count_submissions(query).with_context("Failed to count submissions")
}

pub fn search_submissions(
    store: &FileDocumentStore,
    text: &str,
    limit: Option<usize>,
) -> Result<Vec<SubmissionRecord>, String> {
    store
        .search_submissions(text, limit)
        .with_context("Failed to search submissions")
}

/// Update submission status, returning the record and the status it left
pub fn update_submission_status_internal(
    store: &FileDocumentStore,
    id: &str,
    status: SubmissionStatus,
) -> Result<(SubmissionRecord, SubmissionStatus), String> {
    let old_status = store
        .get_submission(id)
        .with_context("Failed to load submission")?
        .status;
    let record = store
        .update_submission_status(id, status)
        .with_context("Failed to update submission status")?;
    Ok((record, old_status))
}

pub fn assign_submission(
    store: &FileDocumentStore,
    id: &str,
    assignee: Option<String>,
) -> Result<SubmissionRecord, String> {
    store
        .assign_submission(id, assignee)
        .with_context("Failed to assign submission")
}

pub fn delete_submission(store: &FileDocumentStore, id: &str) -> Result<(), String> {
    store.delete_submission(id).with_context("Failed to delete submission")
}

pub fn rebuild_indexes(store: &FileDocumentStore) -> Result<IndexRebuild, String> {
    store.rebuild_indexes().with_context("Failed to rebuild indexes")
}
