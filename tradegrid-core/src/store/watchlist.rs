//! Watchlist of companies, deduplicated by id or name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{JsonStoreExt, KeyValueStore, StoreError};
use crate::missing::is_missing;
use crate::record::{plain_text, RowId};

pub const WATCHLIST_KEY: &str = "tradegrid-watchlist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(default)]
    pub id: Option<RowId>,
    #[serde(default)]
    pub name: String,
    pub added_at: DateTime<Utc>,
    /// Remaining fields of the watched record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchlistEntry {
    /// Matches a lookup key against either the id or the name.
    pub fn matches(&self, key: &str) -> bool {
        self.id.as_ref().map_or(false, |id| id.as_key() == key) || (!self.name.is_empty() && self.name == key)
    }
}

pub struct Watchlist<S> {
    store: S,
}

impl<S: KeyValueStore> Watchlist<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn entries(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        Ok(self.store.get_json(WATCHLIST_KEY)?.unwrap_or_default())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.entries()?.is_empty())
    }

    /// Add a company record. Returns `false` when it is already watched or
    /// carries neither an id nor a name.
    pub fn add(&mut self, company: &Value) -> Result<bool, StoreError> {
        let Some(entry) = entry_from(company) else {
            return Ok(false);
        };
        let mut entries = self.entries()?;
        let duplicate = entries.iter().any(|existing| {
            entry.id.as_ref().map_or(false, |id| existing.matches(&id.as_key()))
                || (!entry.name.is_empty() && existing.matches(&entry.name))
        });
        if duplicate {
            return Ok(false);
        }
        entries.push(entry);
        self.store.set_json(WATCHLIST_KEY, &entries)?;
        Ok(true)
    }

    /// Remove every entry whose id or name equals `key`.
    pub fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|entry| !entry.matches(key));
        if entries.len() == before {
            return Ok(false);
        }
        self.store.set_json(WATCHLIST_KEY, &entries)?;
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries()?.iter().any(|entry| entry.matches(key)))
    }

    /// Add when absent, remove when present. Returns whether it is now watched.
    pub fn toggle(&mut self, company: &Value) -> Result<bool, StoreError> {
        let Some(entry) = entry_from(company) else {
            return Ok(false);
        };
        let key = entry
            .id
            .as_ref()
            .map(RowId::as_key)
            .unwrap_or_else(|| entry.name.clone());
        if self.contains(&key)? {
            self.remove(&key)?;
            Ok(false)
        } else {
            self.add(company)
        }
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.set_json(WATCHLIST_KEY, &Vec::<WatchlistEntry>::new())
    }
}

fn entry_from(company: &Value) -> Option<WatchlistEntry> {
    let map = company.as_object()?;
    let id = map.get("id").and_then(RowId::from_value);
    let name = map
        .get("name")
        .filter(|v| !is_missing(*v))
        .map(plain_text)
        .unwrap_or_default();
    if id.is_none() && name.is_empty() {
        return None;
    }
    let mut extra = map.clone();
    for reserved in ["id", "name", "added_at"] {
        extra.remove(reserved);
    }
    Some(WatchlistEntry {
        id,
        name,
        added_at: Utc::now(),
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn add_deduplicates_by_id_or_name() {
        let mut list = Watchlist::new(MemoryStore::new());
        assert!(list.add(&json!({"id": 1, "name": "Acme", "country": "PK"})).unwrap());
        assert!(!list.add(&json!({"id": 1, "name": "Other"})).unwrap());
        assert!(!list.add(&json!({"id": 2, "name": "Acme"})).unwrap());
        assert!(list.add(&json!({"id": 2, "name": "Beta"})).unwrap());
        assert_eq!(list.len().unwrap(), 2);

        let entries = list.entries().unwrap();
        assert_eq!(entries[0].extra.get("country"), Some(&json!("PK")));
    }

    #[test]
    fn remove_and_contains_by_either_key() {
        let mut list = Watchlist::new(MemoryStore::new());
        list.add(&json!({"id": "c-1", "name": "Acme"})).unwrap();
        assert!(list.contains("c-1").unwrap());
        assert!(list.contains("Acme").unwrap());
        assert!(list.remove("Acme").unwrap());
        assert!(!list.remove("Acme").unwrap());
        assert!(list.is_empty().unwrap());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut list = Watchlist::new(MemoryStore::new());
        let company = json!({"id": 9, "name": "Gamma"});
        assert!(list.toggle(&company).unwrap());
        assert!(!list.toggle(&company).unwrap());
        assert!(!list.contains("9").unwrap());
    }

    #[test]
    fn unidentifiable_records_are_ignored() {
        let mut list = Watchlist::new(MemoryStore::new());
        assert!(!list.add(&json!({"country": "PK"})).unwrap());
        assert!(!list.add(&json!("just a string")).unwrap());
        assert_eq!(list.len().unwrap(), 0);
    }

    #[test]
    fn persists_through_store() {
        let mut list = Watchlist::new(MemoryStore::new());
        list.add(&json!({"name": "Delta"})).unwrap();
        let store = list.into_inner();
        let reopened = Watchlist::new(store);
        assert!(reopened.contains("Delta").unwrap());
    }

    #[test]
    fn clear_empties() {
        let mut list = Watchlist::new(MemoryStore::new());
        list.add(&json!({"name": "Delta"})).unwrap();
        list.clear().unwrap();
        assert!(list.is_empty().unwrap());
    }
}
