//! Persistence seam for the progression record.
//!
//! The record is stored as one JSON blob under a fixed key. Transports only
//! know how to get and set strings; parsing, defaults and sanitizing live in
//! [`ProgressRecord::from_stored`].

use super::record::ProgressRecord;
use super::STORAGE_KEY;
use crate::errors::{StorageError, StorageResult};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Minimal string key-value transport.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Loads and saves whole progression records.
pub trait ProgressRepository: Send + Sync {
    /// The stored record, sanitized. A record that was never saved loads as the default.
    fn load(&self) -> StorageResult<ProgressRecord>;
    fn save(&self, record: &ProgressRecord) -> StorageResult<()>;
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "progress written");
        Ok(())
    }
}

/// Stores the record as JSON under a single key of any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct KeyValueRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KeyValueRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> ProgressRepository for KeyValueRepository<S> {
    fn load(&self) -> StorageResult<ProgressRecord> {
        Ok(match self.store.get(&self.key)? {
            Some(blob) => ProgressRecord::from_stored(&blob),
            None => ProgressRecord::default(),
        })
    }

    fn save(&self, record: &ProgressRecord) -> StorageResult<()> {
        let blob = serde_json::to_string(record)?;
        self.store.set(&self.key, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unsaved_record_loads_as_default() {
        let repository = KeyValueRepository::new(MemoryStore::new());
        assert_eq!(repository.load().expect("memory load"), ProgressRecord::default());
    }

    #[test]
    fn memory_round_trip_uses_the_fixed_key() {
        let store = MemoryStore::new();
        let repository = KeyValueRepository::new(store.clone());
        let mut record = ProgressRecord::default();
        record.coins = 5;
        repository.save(&record).expect("memory save");

        let blob = store.get(STORAGE_KEY).expect("memory get").expect("blob saved");
        assert!(blob.contains("\"coins\":5"));
        assert_eq!(repository.load().expect("memory load"), record);
    }

    #[test]
    fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut record = ProgressRecord::default();
        record.coins = 77;
        record.inventory.push("맹독".to_string());

        KeyValueRepository::new(FileStore::new(dir.path()).expect("open store"))
            .save(&record)
            .expect("file save");

        let reopened = KeyValueRepository::new(FileStore::new(dir.path()).expect("reopen store"));
        assert_eq!(reopened.load().expect("file load"), record);
        assert!(reopened.store().path_for(STORAGE_KEY).exists());
    }

    #[test]
    fn corrupt_file_loads_as_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::new(dir.path()).expect("open store");
        fs::write(store.path_for(STORAGE_KEY), "{ half a record").expect("write garbage");

        let repository = KeyValueRepository::new(store);
        assert_eq!(repository.load().expect("file load"), ProgressRecord::default());
    }
}
