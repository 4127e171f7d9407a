//! Free-text notes keyed by company id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JsonStoreExt, KeyValueStore, StoreError};

pub const NOTES_KEY: &str = "tradegrid-notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CompanyNotes<S> {
    store: S,
}

impl<S: KeyValueStore> CompanyNotes<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn all(&self) -> Result<BTreeMap<String, Note>, StoreError> {
        Ok(self.store.get_json(NOTES_KEY)?.unwrap_or_default())
    }

    pub fn get(&self, company_id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self.all()?.remove(company_id))
    }

    pub fn has(&self, company_id: &str) -> Result<bool, StoreError> {
        Ok(self.all()?.contains_key(company_id))
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.all()?.len())
    }

    /// Create or replace the note for `company_id`. `created_at` survives
    /// updates. Blank content deletes the note.
    pub fn set(&mut self, company_id: &str, content: &str) -> Result<Option<Note>, StoreError> {
        if content.trim().is_empty() {
            self.delete(company_id)?;
            return Ok(None);
        }
        let mut notes = self.all()?;
        let now = Utc::now();
        let created_at = notes.get(company_id).map_or(now, |existing| existing.created_at);
        let note = Note {
            content: content.to_string(),
            created_at,
            updated_at: now,
        };
        notes.insert(company_id.to_string(), note.clone());
        self.store.set_json(NOTES_KEY, &notes)?;
        Ok(Some(note))
    }

    pub fn delete(&mut self, company_id: &str) -> Result<bool, StoreError> {
        let mut notes = self.all()?;
        if notes.remove(company_id).is_none() {
            return Ok(false);
        }
        self.store.set_json(NOTES_KEY, &notes)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn update_preserves_created_at() {
        let mut notes = CompanyNotes::new(MemoryStore::new());
        let first = notes.set("42", "call back Monday").unwrap().unwrap();
        let second = notes.set("42", "called, send samples").unwrap().unwrap();
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(notes.get("42").unwrap().unwrap().content, "called, send samples");
        assert_eq!(notes.count().unwrap(), 1);
    }

    #[test]
    fn blank_content_deletes() {
        let mut notes = CompanyNotes::new(MemoryStore::new());
        notes.set("1", "x").unwrap();
        assert_eq!(notes.set("1", "   ").unwrap(), None);
        assert!(!notes.has("1").unwrap());
    }

    #[test]
    fn delete_reports_presence() {
        let mut notes = CompanyNotes::new(MemoryStore::new());
        notes.set("1", "x").unwrap();
        notes.set("2", "y").unwrap();
        assert!(notes.delete("1").unwrap());
        assert!(!notes.delete("1").unwrap());
        let all = notes.all().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["2"]);
    }
}
