//! JSON file storage

use super::KeyValueStore;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Persistent store holding every key in one JSON object file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries, and whether the file on disk needs rewriting.
    ///
    /// An unparseable file reads as empty, like cleared browser storage.
    fn read_all(&self) -> Result<(BTreeMap<String, String>, bool)> {
        if !self.path.exists() {
            return Ok((BTreeMap::new(), false));
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok((BTreeMap::new(), false));
        }
        match serde_json::from_str(&content) {
            Ok(entries) => Ok((entries, false)),
            Err(e) => {
                warn!(
                    "Discarding unreadable storage file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((BTreeMap::new(), true))
            }
        }
    }

    /// Write to a sibling temp file, then rename over the store
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| Error::Storage("file store lock poisoned".to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard()?;
        let (mut entries, _) = self.read_all()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard()?;
        let (mut entries, _) = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.guard()?;
        let (mut entries, damaged) = self.read_all()?;
        if entries.remove(key).is_some() || damaged {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("auth_token").unwrap(), None);
        store.remove("auth_token").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local_storage.json");

        FileStore::new(&path).set("auth_token", "a.b.c").unwrap();
        FileStore::new(&path).set("theme", "dark").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("a.b.c"));
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));

        reopened.remove("auth_token").unwrap();
        assert_eq!(FileStore::new(&path).get("auth_token").unwrap(), None);
        assert_eq!(FileStore::new(&path).get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        fs::write(&path, r#"{"auth_token": "a.b.c""#).unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("auth_token").unwrap(), None);

        store.set("auth_token", "d.e.f").unwrap();
        assert_eq!(
            FileStore::new(&path).get("auth_token").unwrap().as_deref(),
            Some("d.e.f")
        );
        assert!(!dir.path().join("local_storage.json.tmp").exists());
    }

    #[test]
    fn test_remove_repairs_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        fs::write(&path, "not json").unwrap();

        FileStore::new(&path).remove("auth_token").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let entries: BTreeMap<String, String> = serde_json::from_str(&content).unwrap();
        assert!(entries.is_empty());
    }
}
