//! Durable storage of the task collection.
//!
//! The interpreter only sees the `Storage` trait. `JsonStorage` is the file-backed
//! implementation: a pretty-printed JSON document written atomically (temp file +
//! rename) after every mutating command.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::TaskList;
use crate::task::Task;

/// Default file name inside the data directory.
pub const DEFAULT_FILE_NAME: &str = "tasks.json";

/// Failures reading or writing the data file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed JSON, or a record that fails task validation.
    #[error("Data file {} is corrupted: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode task list: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Data file {} does not exist", .path.display())]
    Missing { path: PathBuf },
}

/// Where the task collection lives between sessions.
pub trait Storage {
    /// Read the persisted collection. Called once at session start.
    fn load(&self) -> Result<TaskList, StorageError>;

    /// Persist the whole collection, replacing what was stored.
    fn save(&self, tasks: &TaskList) -> Result<(), StorageError>;
}

#[derive(Deserialize)]
struct DataFile {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct DataFileRef<'a> {
    saved_at: DateTime<Utc>,
    tasks: &'a [Task],
}

/// JSON file storage.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    /// A missing file is an empty collection.
    fn load(&self) -> Result<TaskList, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(TaskList::default());
        }
        let buf = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        let file: DataFile = serde_json::from_str(&buf).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        info!(
            path = %self.path.display(),
            tasks = file.tasks.len(),
            saved_at = ?file.saved_at,
            "loaded task list"
        );
        Ok(TaskList::new(file.tasks))
    }

    fn save(&self, tasks: &TaskList) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        let data = serde_json::to_string_pretty(&DataFileRef {
            saved_at: Utc::now(),
            tasks: tasks.as_slice(),
        })
        .map_err(StorageError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        debug!(path = %self.path.display(), tasks = tasks.len(), "saved task list");
        Ok(())
    }
}

/// `$HOME/.keyboard_warrior/tasks.json`, or `./.keyboard_warrior/tasks.json`
/// when `HOME` is unset.
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".keyboard_warrior")
        .join(DEFAULT_FILE_NAME)
}

/// Create a timestamped backup of the data file in a `backup` directory beside it.
pub fn create_backup(path: &Path) -> Result<PathBuf, StorageError> {
    if !path.exists() {
        return Err(StorageError::Missing {
            path: path.to_path_buf(),
        });
    }

    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    let write_err = |source| StorageError::Write {
        path: backup_dir.clone(),
        source,
    };
    fs::create_dir_all(&backup_dir).map_err(write_err)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_FILE_NAME);
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));

    fs::copy(path, &backup_path).map_err(write_err)?;
    info!(backup = %backup_path.display(), "created backup");
    Ok(backup_path)
}
