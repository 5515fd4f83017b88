use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use crate::io::lock::{LockError, StoreLock};
use crate::model::task::Task;

/// Key holding the JSON array of tasks
pub const TODOS_KEY: &str = "todos";
/// Key holding `"true"` / `"false"`
pub const DARK_MODE_KEY: &str = "darkMode";
/// File name of the on-disk store inside the data directory
pub const STORE_FILE: &str = "store.json";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid store: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store rejected write: {0}")]
    Rejected(String),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// A string key-value store
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store kept entirely in memory. Counts writes; can be told to refuse them.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: IndexMap<String, String>,
    writes: usize,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails (e.g. quota exceeded)
    pub fn rejecting() -> Self {
        MemoryStore {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful `set`/`remove` calls
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Rejected(format!("quota exceeded writing {}", key)));
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Rejected(format!("quota exceeded removing {}", key)));
        }
        self.values.shift_remove(key);
        self.writes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Store persisted as one JSON object in `<data-dir>/store.json`.
///
/// Every write re-reads the file under the data-dir lock, applies the change
/// and replaces the file atomically, so concurrent processes never see a torn
/// file. Concurrent writers to the same key: last write wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileStore {
    /// Open (creating the directory if needed) the store in `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::WriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
            path: dir.join(STORE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_map(&self) -> Result<IndexMap<String, String>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => {
                return Err(StoreError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    fn update(&self, apply: impl FnOnce(&mut IndexMap<String, String>)) -> Result<(), StoreError> {
        let _lock = StoreLock::acquire_default(&self.dir)?;
        let mut map = match self.read_map() {
            Ok(m) => m,
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "discarding corrupt store");
                IndexMap::new()
            }
            Err(e) => return Err(e),
        };
        apply(&mut map);
        let content = serde_json::to_string_pretty(&map)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.update(|map| {
            map.shift_remove(key);
        })
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Typed accessors
// ---------------------------------------------------------------------------

/// Load the task collection. Unreadable or corrupt data yields an empty
/// collection; individual malformed records are skipped.
pub fn load_tasks<S: Store + ?Sized>(store: &S) -> Vec<Task> {
    let raw = match store.get(TODOS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved tasks");
            return Vec::new();
        }
    };
    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "saved tasks are not a JSON array");
            return Vec::new();
        }
    };
    let total = records.len();
    let tasks: Vec<Task> = records
        .into_iter()
        .filter_map(|r| serde_json::from_value(r).ok())
        .collect();
    if tasks.len() != total {
        tracing::warn!(
            skipped = total - tasks.len(),
            "skipped malformed saved task records"
        );
    }
    tasks
}

/// Persist the whole task collection as one blob.
pub fn save_tasks<S: Store + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), StoreError> {
    let blob = serde_json::to_string(tasks)?;
    store.set(TODOS_KEY, &blob)
}

/// `None` when no preference has been saved yet.
pub fn load_dark_mode<S: Store + ?Sized>(store: &S) -> Option<bool> {
    match store.get(DARK_MODE_KEY) {
        Ok(v) => v.map(|s| s == "true"),
        Err(e) => {
            tracing::warn!(error = %e, "could not read theme preference");
            None
        }
    }
}

pub fn save_dark_mode<S: Store + ?Sized>(store: &mut S, dark: bool) -> Result<(), StoreError> {
    store.set(DARK_MODE_KEY, if dark { "true" } else { "false" })
}
