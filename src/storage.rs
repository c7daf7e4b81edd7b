use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::hours::Hours;
use crate::models::Timesheet;
use crate::validate::{DURATION_MAX, DURATION_MIN};

/// Key under which the timesheet collection is stored and announced.
pub const STORAGE_KEY: &str = "timesheets";

/// A synchronous string key-value store shared by every context that works on
/// the same timesheets.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Clone an `Arc` of it to share between contexts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Each write goes to its own temporary file that is then renamed over the
/// target, so a concurrent reader sees either the old or the new value and
/// concurrent writers do not interfere; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<FileStore, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote store file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serializes a timesheet collection for storage.
pub fn encode_timesheets(timesheets: &[Timesheet]) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(timesheets)?)
}

/// Parses a stored collection, recomputing derived totals and statuses.
///
/// Weeks that break the data model (week number 0, reversed date range, task
/// durations outside the allowed bounds) make the whole collection invalid.
pub fn decode_timesheets(raw: &str) -> Result<Vec<Timesheet>, StorageError> {
    let mut timesheets: Vec<Timesheet> = serde_json::from_str(raw)?;
    for t in timesheets.iter_mut() {
        check_timesheet(t)?;
        t.refresh();
    }
    Ok(timesheets)
}

fn check_timesheet(t: &Timesheet) -> Result<(), StorageError> {
    if t.week_number == 0 {
        return Err(StorageError::Invalid(format!("timesheet '{}' has week number 0", t.id)));
    }
    if t.start_date > t.end_date {
        return Err(StorageError::Invalid(format!(
            "timesheet '{}' starts on {} after it ends on {}",
            t.id, t.start_date, t.end_date
        )));
    }
    let min = Hours::from_millis((DURATION_MIN * 1000.0) as i64);
    let max = Hours::from_millis((DURATION_MAX * 1000.0) as i64);
    let mut total = Hours::ZERO;
    for task in &t.tasks {
        if task.duration < min || task.duration > max {
            return Err(StorageError::Invalid(format!(
                "task '{}' in timesheet '{}' has duration {} outside {} to {} hours",
                task.id, t.id, task.duration, min, max
            )));
        }
        total = total.checked_add(task.duration).ok_or_else(|| {
            StorageError::Invalid(format!("timesheet '{}' total hours overflow", t.id))
        })?;
    }
    Ok(())
}

/// Loads the collection under [`STORAGE_KEY`]. `None` when nothing is stored.
pub fn load_timesheets(store: &dyn KeyValueStore) -> Result<Option<Vec<Timesheet>>, StorageError> {
    match store.get(STORAGE_KEY)? {
        Some(raw) => Ok(Some(decode_timesheets(&raw)?)),
        None => Ok(None),
    }
}

/// Overwrites the stored collection, returning the serialized value written.
pub fn save_timesheets(store: &dyn KeyValueStore, timesheets: &[Timesheet]) -> Result<String, StorageError> {
    let raw = encode_timesheets(timesheets)?;
    store.set(STORAGE_KEY, &raw)?;
    Ok(raw)
}

/// Deletes the stored collection so the next open starts from the defaults.
pub fn delete_timesheets(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove(STORAGE_KEY)
}
