//! File-based document store for intake submissions and contact messages
//!
//! Every document is one pretty-printed JSON file; each collection keeps an
//! `index.json` with the metadata needed for listing views.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   store.lock          - fs2 lock serializing writers across processes
//!   submissions/
//!     index.json
//!     sub_<12 hex>.json
//!   contacts/
//!     index.json
//!     msg_<12 hex>.json
//! ```

pub mod contacts;
pub mod index;
pub mod lifecycle;
pub mod schema;
pub mod store;
pub mod submissions;

pub use contacts::{ContactRecord, ContactStatus};
pub use index::{ContactIndexEntry, SubmissionIndexEntry};
pub use lifecycle::{Priority, SubmissionStatus, TransitionError};
pub use store::FileDocumentStore;
pub use submissions::{SubmissionQuery, SubmissionRecord};

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Common file operations result type
pub type FileResult<T> = Result<T, String>;

/// Collection directory names
pub const SUBMISSIONS: &str = "submissions";
pub const CONTACTS: &str = "contacts";

/// Get the global ~/.intake-site directory
pub fn get_global_intake_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".intake-site")
}

/// Default data directory (`~/.intake-site/data`)
pub fn default_data_dir() -> PathBuf {
    get_global_intake_dir().join("data")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write data to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path)
        .map_err(|e| format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e))?;

    Ok(())
}

/// Read a JSON file and deserialize it
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse JSON from {:?}: {}", path, e))
}

/// Write data as pretty-printed JSON atomically
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> FileResult<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize to JSON: {}", e))?;

    atomic_write(path, &content)
}

/// Initialize the data directory and both collection directories
pub fn init_data_dir(data_dir: &Path) -> FileResult<PathBuf> {
    ensure_dir(data_dir)?;
    ensure_dir(&data_dir.join(SUBMISSIONS))?;
    ensure_dir(&data_dir.join(CONTACTS))?;
    Ok(data_dir.to_path_buf())
}

/// Generate a document id: `<prefix>_` followed by 12 hex chars
pub fn new_id(prefix: &str) -> String {
    format!(
        "{}_{}",
        prefix,
        &Uuid::new_v4().to_string().replace('-', "")[..12]
    )
}

/// Whether `id` has the shape produced by [`new_id`] for `prefix`.
/// Ids become file names, so anything else is refused.
pub fn is_valid_id(prefix: &str, id: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .map(|hex| hex.len() == 12 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// Path of a document file inside a collection
pub fn document_path(data_dir: &Path, collection: &str, id: &str) -> PathBuf {
    data_dir.join(collection).join(format!("{}.json", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("c");

        assert!(!nested_path.exists());
        ensure_dir(&nested_path).unwrap();
        assert!(nested_path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("doc.json");

        atomic_write(&file_path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
        assert!(!file_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_read_write_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("data.json");

        let data = serde_json::json!({"name": "Acme", "budget": 12000});
        write_json(&file_path, &data).unwrap();

        let read: serde_json::Value = read_json(&file_path).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_read_json_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let err = read_json::<serde_json::Value>(&missing).unwrap_err();
        assert!(err.contains("missing.json"));
    }

    #[test]
    fn test_init_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");

        init_data_dir(&data_dir).unwrap();
        assert!(data_dir.join(SUBMISSIONS).is_dir());
        assert!(data_dir.join(CONTACTS).is_dir());
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id("sub");
        assert!(id.starts_with("sub_"));
        assert_eq!(id.len(), 16);
        assert!(is_valid_id("sub", &id));
        assert_ne!(new_id("sub"), new_id("sub"));
    }

    #[test]
    fn test_is_valid_id_rejects_traversal() {
        assert!(!is_valid_id("sub", "../../etc/passwd"));
        assert!(!is_valid_id("sub", "msg_0123456789ab"));
        assert!(!is_valid_id("sub", "sub_0123456789"));
        assert!(!is_valid_id("sub", "sub_0123456789zz"));
        assert!(is_valid_id("sub", "sub_0123456789ab"));
    }
}
