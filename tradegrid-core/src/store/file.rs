//! File-backed store: one pretty-printed JSON object per file.
//!
//! The whole map is loaded on open and written through on every mutation.
//! A missing or corrupt file opens as an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn load(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return BTreeMap::new(),
    };
    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "store file is corrupt; starting empty");
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = JsonFileStore::open(&path);
        store.set("watchlist", "[1,2]".into()).unwrap();
        store.set("theme", "\"dark\"".into()).unwrap();
        store.delete("theme").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("watchlist").unwrap(), Some("[1,2]".into()));
        assert_eq!(reopened.get("theme").unwrap(), None);
    }

    #[test]
    fn missing_file_opens_empty() {
        let store = JsonFileStore::open("/nonexistent/dir/session.json");
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not valid json {{{").unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "1".into()).unwrap();
        assert_eq!(JsonFileStore::open(&path).get("k").unwrap(), Some("1".into()));
    }
}
