//! Index file management for efficient listing
//!
//! Index files provide quick access to lists of documents without reading
//! all individual files. They contain minimal metadata for listing views.

use super::lifecycle::{Priority, SubmissionStatus};
use super::{atomic_write, ensure_dir, read_json, ContactStatus, FileResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Version of the index file format
const INDEX_VERSION: u32 = 1;

/// Generic index file wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile<T> {
    /// File format version
    pub version: u32,
    /// When this index was last updated
    pub updated_at: DateTime<Utc>,
    /// The indexed entries
    pub entries: Vec<T>,
}

impl<T> Default for IndexFile<T> {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            updated_at: Utc::now(),
            entries: Vec::new(),
        }
    }
}

/// Submission index entry (minimal info for listing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionIndexEntry {
    pub id: String,
    pub name: Option<String>,
    pub project_type: Option<String>,
    pub status: SubmissionStatus,
    pub priority: Priority,
    pub contact_email: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact message index entry (minimal info for listing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactIndexEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

/// Get the path to a collection's index file
pub fn get_index_path(data_dir: &Path, collection: &str) -> PathBuf {
    data_dir.join(collection).join("index.json")
}

/// Read an index file, returning an empty index if it doesn't exist
pub fn read_index<T: serde::de::DeserializeOwned>(
    data_dir: &Path,
    collection: &str,
) -> FileResult<IndexFile<T>> {
    let index_path = get_index_path(data_dir, collection);

    if !index_path.exists() {
        return Ok(IndexFile::default());
    }

    read_json(&index_path)
}

/// Write an index file
pub fn write_index<T: serde::Serialize>(
    data_dir: &Path,
    collection: &str,
    entries: Vec<T>,
) -> FileResult<()> {
    let index_path = get_index_path(data_dir, collection);

    if let Some(parent) = index_path.parent() {
        ensure_dir(parent)?;
    }

    let index = IndexFile {
        version: INDEX_VERSION,
        updated_at: Utc::now(),
        entries,
    };

    let content = serde_json::to_string_pretty(&index)
        .map_err(|e| format!("Failed to serialize index: {}", e))?;

    atomic_write(&index_path, &content)
}

/// Insert or replace a single entry in an index file
pub fn upsert_index_entry<T>(data_dir: &Path, collection: &str, entry: T) -> FileResult<()>
where
    T: serde::de::DeserializeOwned + serde::Serialize + HasId,
{
    let mut index: IndexFile<T> = read_index(data_dir, collection)?;

    match index
        .entries
        .iter()
        .position(|e| e.get_id() == entry.get_id())
    {
        Some(idx) => index.entries[idx] = entry,
        None => index.entries.push(entry),
    }

    write_index(data_dir, collection, index.entries)
}

/// Remove an entry from an index file
pub fn remove_index_entry<T>(data_dir: &Path, collection: &str, entry_id: &str) -> FileResult<()>
where
    T: serde::de::DeserializeOwned + serde::Serialize + HasId,
{
    let mut index: IndexFile<T> = read_index(data_dir, collection)?;

    let initial_len = index.entries.len();
    index.entries.retain(|e| e.get_id() != entry_id);

    // Only write if something changed
    if index.entries.len() != initial_len {
        write_index(data_dir, collection, index.entries)?;
    }

    Ok(())
}

/// Document files of a collection (every `*.json` except the index)
pub fn document_files(data_dir: &Path, collection: &str) -> FileResult<Vec<PathBuf>> {
    let dir_path = data_dir.join(collection);

    if !dir_path.exists() {
        return Ok(Vec::new());
    }

    let files = fs::read_dir(&dir_path)
        .map_err(|e| format!("Failed to read directory {:?}: {}", dir_path, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .filter(|path| path.file_name().map(|n| n != "index.json").unwrap_or(false))
        .collect();

    Ok(files)
}

/// Rebuild an index from the individual document files of a collection
pub fn rebuild_index<T, F>(data_dir: &Path, collection: &str, file_to_entry: F) -> FileResult<Vec<T>>
where
    T: serde::Serialize + Clone,
    F: Fn(&Path) -> Option<T>,
{
    let entries: Vec<T> = document_files(data_dir, collection)?
        .iter()
        .filter_map(|path| file_to_entry(path))
        .collect();

    write_index(data_dir, collection, entries.clone())?;

    Ok(entries)
}

/// Trait for types that have an ID field
pub trait HasId {
    fn get_id(&self) -> &str;
}

impl HasId for SubmissionIndexEntry {
    fn get_id(&self) -> &str {
        &self.id
    }
}

impl HasId for ContactIndexEntry {
    fn get_id(&self) -> &str {
        &self.id
    }
}
