//! Saved filter values merged over a set of defaults.

use serde_json::{Map, Value};

use super::{JsonStoreExt, KeyValueStore, StoreError};
use crate::missing::is_missing;

pub struct FilterPersistence<S> {
    store: S,
    key: String,
    defaults: Map<String, Value>,
}

impl<S: KeyValueStore> FilterPersistence<S> {
    pub fn new(store: S, key: impl Into<String>, defaults: Map<String, Value>) -> Self {
        Self {
            store,
            key: key.into(),
            defaults,
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Defaults overlaid with whatever was saved.
    pub fn filters(&self) -> Result<Map<String, Value>, StoreError> {
        let saved: Map<String, Value> = self.store.get_json(&self.key)?.unwrap_or_default();
        let mut merged = self.defaults.clone();
        merged.extend(saved);
        Ok(merged)
    }

    pub fn set_filter(&mut self, name: &str, value: Value) -> Result<(), StoreError> {
        let mut current = self.filters()?;
        current.insert(name.to_string(), value);
        self.store.set_json(&self.key, &current)
    }

    pub fn set_filters(&mut self, updates: Map<String, Value>) -> Result<(), StoreError> {
        let mut current = self.filters()?;
        current.extend(updates);
        self.store.set_json(&self.key, &current)
    }

    /// Overwrite the saved state with the defaults.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.set_json(&self.key, &self.defaults)
    }

    /// Forget the saved state entirely.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.delete(&self.key)
    }

    /// True when any filter differs from its default and is not blank.
    pub fn has_active_filters(&self) -> Result<bool, StoreError> {
        let current = self.filters()?;
        Ok(current
            .iter()
            .any(|(name, value)| self.defaults.get(name) != Some(value) && !is_missing(value)))
    }
}
