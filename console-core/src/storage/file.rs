use super::KeyValueStore;
use crate::error::StorageError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed store holding every key in a single JSON object.
///
/// The file is re-read on every access so that separate invocations of the
/// console observe each other's writes. Writes go to a sibling temp file
/// which is then renamed over the original. Reads of an unparseable file
/// fail, but a write replaces it with a fresh document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        let mut entries = match self.load() {
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable storage file"
                );
                BTreeMap::new()
            }
            other => other?,
        };
        mutate(&mut entries);
        self.persist(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store.set("access_token", "a.b.c").unwrap();
        store.set("refresh_token", "r").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("access_token").unwrap().as_deref(),
            Some("a.b.c")
        );
        assert_eq!(reopened.get("refresh_token").unwrap().as_deref(), Some("r"));
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));

        store.remove("access_token").unwrap();
        assert!(store.get("access_token").unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get("access_token"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{truncated").unwrap();

        let store = FileStore::new(&path);
        store.set("access_token", "a.b.c").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("access_token").unwrap().as_deref(),
            Some("a.b.c")
        );
    }

    #[test]
    fn test_remove_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{truncated").unwrap();

        let store = FileStore::new(&path);
        store.remove("auth-storage").unwrap();

        assert!(store.get("auth-storage").unwrap().is_none());
    }
}
