//! Session persistence behind a small key-value abstraction.
//!
//! The presentation core never touches storage directly. Watchlists, notes
//! and saved filters are typed views over any [`KeyValueStore`]; values are
//! JSON strings.

pub mod file;
pub mod filters;
pub mod memory;
pub mod notes;
pub mod watchlist;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use file::JsonFileStore;
pub use filters::FilterPersistence;
pub use memory::MemoryStore;
pub use notes::{CompanyNotes, Note};
pub use watchlist::{Watchlist, WatchlistEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Typed JSON access on top of any store.
pub trait JsonStoreExt: KeyValueStore {
    /// Read and decode `key`. An undecodable value is treated as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding undecodable stored value");
                Ok(None)
            }
        }
    }

    fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.set(key, json)
    }
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {}
