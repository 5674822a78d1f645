//! File-backed document store
//!
//! Writers are serialized twice: an in-process mutex for threads of this
//! server, and an exclusive fs2 lock on `store.lock` for other processes
//! sharing the data directory (e.g. `--rebuild-indexes`). Reads go straight
//! to disk; documents are only ever replaced by rename.

use super::contacts::{self, ContactRecord, ContactStatus};
use super::index::{
    self, read_index, remove_index_entry, upsert_index_entry, ContactIndexEntry,
    SubmissionIndexEntry,
};
use super::lifecycle::{self, SubmissionStatus};
use super::schema;
use super::submissions::{self, sort_newest_first, SubmissionQuery, SubmissionRecord};
use super::{init_data_dir, read_json, FileResult, CONTACTS, SUBMISSIONS};
use crate::contact::ContactForm;
use crate::intake::fields::{FieldName, FormValues};
use crate::intake::gateway::{StoreError, SubmissionStore};
use chrono::Utc;
use fs2::FileExt;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOCK_FILE: &str = "store.lock";
const PROBE_FILE: &str = ".write-probe";

/// Entry counts after an index rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRebuild {
    pub submissions: usize,
    pub contacts: usize,
}

/// JSON-file document store with `submissions` and `contacts` collections
pub struct FileDocumentStore {
    data_dir: PathBuf,
    required_fields: Vec<FieldName>,
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Open (and initialize if needed) a store rooted at `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        init_data_dir(data_dir).map_err(StoreError::Unavailable)?;
        log::debug!("Document store opened at {:?}", data_dir);

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            required_fields: Vec::new(),
            write_lock: Mutex::new(()),
        })
    }

    /// Fields every submission must carry (default: none)
    pub fn with_required_fields(mut self, required_fields: Vec<FieldName>) -> Self {
        self.required_fields = required_fields;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn required_fields(&self) -> &[FieldName] {
        &self.required_fields
    }

    /// Probe that the data directory accepts writes
    pub fn check_writable(&self) -> Result<(), StoreError> {
        let probe = self.data_dir.join(PROBE_FILE);
        fs::write(&probe, b"ok")
            .and_then(|_| fs::remove_file(&probe))
            .map_err(|e| {
                StoreError::Unavailable(format!(
                    "Data directory {:?} is not writable: {}",
                    self.data_dir, e
                ))
            })
    }

    /// Run `op` while holding both the process mutex and the file lock
    fn with_write_lock<T>(
        &self,
        op: impl FnOnce(&Path) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Internal("Store write lock poisoned".to_string()))?;

        let lock_path = self.data_dir.join(LOCK_FILE);
        let lock_file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to open lock file: {}", e)))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire store lock: {}", e)))?;

        // Lock released when lock_file is dropped
        op(&self.data_dir)
    }

    // Submissions

    /// Check, stamp and persist a submission
    pub fn create_submission_record(
        &self,
        values: &FormValues,
    ) -> Result<SubmissionRecord, StoreError> {
        schema::check_submission(values, &self.required_fields).map_err(StoreError::Rejected)?;

        let record = SubmissionRecord::new(values.clone());
        self.with_write_lock(|dir| {
            submissions::save_submission_in(dir, &record).map_err(StoreError::Unavailable)?;
            if let Err(e) = upsert_index_entry(dir, SUBMISSIONS, record.to_index_entry()) {
                // Unindexed documents would reappear on the next rebuild
                if let Err(cleanup) = submissions::delete_submission_in(dir, &record.id) {
                    log::warn!("Orphaned submission {}: {}", record.id, cleanup);
                }
                return Err(StoreError::Unavailable(e));
            }
            Ok(())
        })?;

        log::info!(
            "Created submission {} (priority {:?}, estimate {})",
            record.id,
            record.priority,
            record.estimated_budget
        );
        Ok(record)
    }

    pub fn get_submission(&self, id: &str) -> Result<SubmissionRecord, StoreError> {
        submissions::read_submission_in(&self.data_dir, id)
            .map_err(StoreError::Unavailable)?
            .ok_or_else(|| StoreError::NotFound(format!("Submission {}", id)))
    }

    /// List submissions matching the query, newest first
    pub fn list_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<SubmissionIndexEntry>, StoreError> {
        let entries = self.submission_entries()?;
        Ok(query.apply(entries))
    }

    /// Count submissions matching the query's filters (paging ignored)
    pub fn count_submissions(&self, query: &SubmissionQuery) -> Result<usize, StoreError> {
        Ok(self
            .submission_entries()?
            .iter()
            .filter(|entry| query.matches(entry))
            .count())
    }

    /// Case-insensitive text search over full submission documents
    pub fn search_submissions(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let needle = text.trim().to_lowercase();
        let mut entries = self.submission_entries()?;
        sort_newest_first(&mut entries);

        let mut found = Vec::new();
        for entry in entries {
            if limit.map(|l| found.len() >= l).unwrap_or(false) {
                break;
            }
            let record = match submissions::read_submission_in(&self.data_dir, &entry.id) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable submission {}: {}", entry.id, e);
                    continue;
                }
            };
            if needle.is_empty() || record.matches_text(&needle) {
                found.push(record);
            }
        }
        Ok(found)
    }

    /// Move a submission to a new status, enforcing the lifecycle
    pub fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<SubmissionRecord, StoreError> {
        let record = self.modify_submission(id, |record| {
            record.status = lifecycle::transition_status(record.status, status)
                .map_err(|e| StoreError::Conflict(e.to_string()))?;
            Ok(())
        })?;
        log::info!("Submission {} is now {}", id, record.status);
        Ok(record)
    }

    /// Assign a submission to someone, or clear the assignment with `None`
    pub fn assign_submission(
        &self,
        id: &str,
        assignee: Option<String>,
    ) -> Result<SubmissionRecord, StoreError> {
        let assignee = assignee
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self.modify_submission(id, move |record| {
            record.assigned_to = assignee;
            Ok(())
        })
    }

    pub fn delete_submission(&self, id: &str) -> Result<(), StoreError> {
        self.with_write_lock(|dir| {
            let removed =
                submissions::delete_submission_in(dir, id).map_err(StoreError::Unavailable)?;
            if !removed {
                return Err(StoreError::NotFound(format!("Submission {}", id)));
            }
            remove_index_entry::<SubmissionIndexEntry>(dir, SUBMISSIONS, id)
                .map_err(StoreError::Unavailable)
        })?;
        log::info!("Deleted submission {}", id);
        Ok(())
    }

    fn modify_submission(
        &self,
        id: &str,
        change: impl FnOnce(&mut SubmissionRecord) -> Result<(), StoreError>,
    ) -> Result<SubmissionRecord, StoreError> {
        self.with_write_lock(|dir| {
            let mut record = submissions::read_submission_in(dir, id)
                .map_err(StoreError::Unavailable)?
                .ok_or_else(|| StoreError::NotFound(format!("Submission {}", id)))?;

            let before = record.clone();
            change(&mut record)?;
            if record == before {
                return Ok(record);
            }

            record.updated_at = Utc::now();
            submissions::save_submission_in(dir, &record).map_err(StoreError::Unavailable)?;
            upsert_index_entry(dir, SUBMISSIONS, record.to_index_entry())
                .map_err(StoreError::Unavailable)?;
            Ok(record)
        })
    }

    fn submission_entries(&self) -> Result<Vec<SubmissionIndexEntry>, StoreError> {
        read_index::<SubmissionIndexEntry>(&self.data_dir, SUBMISSIONS)
            .map(|index| index.entries)
            .map_err(StoreError::Unavailable)
    }

    // Contacts

    /// Check and persist a contact message
    pub fn create_contact(&self, form: &ContactForm) -> Result<ContactRecord, StoreError> {
        schema::check_contact(form).map_err(StoreError::Rejected)?;

        let record = ContactRecord::from_form(form);
        self.with_write_lock(|dir| {
            contacts::save_contact_in(dir, &record).map_err(StoreError::Unavailable)?;
            if let Err(e) = upsert_index_entry(dir, CONTACTS, record.to_index_entry()) {
                if let Err(cleanup) = contacts::delete_contact_in(dir, &record.id) {
                    log::warn!("Orphaned contact message {}: {}", record.id, cleanup);
                }
                return Err(StoreError::Unavailable(e));
            }
            Ok(())
        })?;
        Ok(record)
    }

    pub fn get_contact(&self, id: &str) -> Result<ContactRecord, StoreError> {
        contacts::read_contact_in(&self.data_dir, id)
            .map_err(StoreError::Unavailable)?
            .ok_or_else(|| StoreError::NotFound(format!("Contact message {}", id)))
    }

    /// List contact messages, newest first
    pub fn list_contacts(
        &self,
        status: Option<ContactStatus>,
    ) -> Result<Vec<ContactIndexEntry>, StoreError> {
        let mut entries: Vec<ContactIndexEntry> = self
            .contact_entries()?
            .into_iter()
            .filter(|e| status.map(|s| s == e.status).unwrap_or(true))
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    pub fn count_contacts(&self, status: Option<ContactStatus>) -> Result<usize, StoreError> {
        Ok(self
            .contact_entries()?
            .iter()
            .filter(|e| status.map(|s| s == e.status).unwrap_or(true))
            .count())
    }

    pub fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<ContactRecord, StoreError> {
        self.with_write_lock(|dir| {
            let mut record = contacts::read_contact_in(dir, id)
                .map_err(StoreError::Unavailable)?
                .ok_or_else(|| StoreError::NotFound(format!("Contact message {}", id)))?;
            if record.status == status {
                return Ok(record);
            }

            record.status = status;
            record.updated_at = Utc::now();
            contacts::save_contact_in(dir, &record).map_err(StoreError::Unavailable)?;
            upsert_index_entry(dir, CONTACTS, record.to_index_entry())
                .map_err(StoreError::Unavailable)?;
            Ok(record)
        })
    }

    pub fn delete_contact(&self, id: &str) -> Result<(), StoreError> {
        self.with_write_lock(|dir| {
            let removed = contacts::delete_contact_in(dir, id).map_err(StoreError::Unavailable)?;
            if !removed {
                return Err(StoreError::NotFound(format!("Contact message {}", id)));
            }
            remove_index_entry::<ContactIndexEntry>(dir, CONTACTS, id)
                .map_err(StoreError::Unavailable)
        })
    }

    fn contact_entries(&self) -> Result<Vec<ContactIndexEntry>, StoreError> {
        read_index::<ContactIndexEntry>(&self.data_dir, CONTACTS)
            .map(|index| index.entries)
            .map_err(StoreError::Unavailable)
    }

    // Maintenance

    /// Rebuild both index files from the document files
    pub fn rebuild_indexes(&self) -> Result<IndexRebuild, StoreError> {
        let rebuilt = self.with_write_lock(|dir| {
            let submissions = index::rebuild_index(dir, SUBMISSIONS, |path| {
                read_document::<SubmissionRecord>(path).map(|r| r.to_index_entry())
            })
            .map_err(StoreError::Unavailable)?;
            let contacts = index::rebuild_index(dir, CONTACTS, |path| {
                read_document::<ContactRecord>(path).map(|r| r.to_index_entry())
            })
            .map_err(StoreError::Unavailable)?;

            Ok(IndexRebuild {
                submissions: submissions.len(),
                contacts: contacts.len(),
            })
        })?;

        log::info!(
            "Rebuilt indexes: {} submission(s), {} contact message(s)",
            rebuilt.submissions,
            rebuilt.contacts
        );
        Ok(rebuilt)
    }
}

impl SubmissionStore for FileDocumentStore {
    fn create_submission(&self, values: &FormValues) -> Result<String, StoreError> {
        self.create_submission_record(values).map(|record| record.id)
    }
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let result: FileResult<T> = read_json(path);
    match result {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Skipping unreadable document: {}", e);
            None
        }
    }
}
