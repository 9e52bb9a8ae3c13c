//! Browser persistence behind an injectable key/value interface.
//!
//! Every tool that remembers something (saved rules, saved QR codes, theme
//! preferences) goes through [`KeyValueStore`]. The browser build uses
//! [`LocalStore`], tests use [`MemoryStore`].

mod repositories;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use repositories::{Record, RecordList, Theme, ThemeRepository};

pub const SAVED_RULES_KEY: &str = "kace_saved_rules";
pub const SAVED_QR_CODES_KEY: &str = "saved_qr_codes";
pub const THEME_KEY: &str = "theme";
pub const COMPONENT_THEME_PREFIX: &str = "component-theme-";
pub const INSTALL_DISMISSED_KEY: &str = "pwa-install-dismissed";

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Backend(String),
    #[error("stored value for `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for `{0}` could not be encoded")]
    Encode(String),
    #[error("record `{0}` not found")]
    NotFound(String),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> StorageResult<()>;
    fn delete(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
}

pub fn load<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub fn save<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let encoded =
        serde_json::to_value(value).map_err(|_| StorageError::Encode(key.to_string()))?;
    store.set(key, &encoded)
}

/// `window.localStorage` through `gloo-storage`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        use gloo_storage::errors::StorageError as GlooError;
        use gloo_storage::{LocalStorage, Storage};

        match LocalStorage::get::<Value>(key) {
            Ok(value) => Ok(Some(value)),
            Err(GlooError::KeyNotFound(_)) => Ok(None),
            Err(GlooError::SerdeError(source)) => Err(StorageError::Malformed {
                key: key.to_string(),
                source,
            }),
            Err(err) => Err(StorageError::Backend(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        use gloo_storage::{LocalStorage, Storage};

        LocalStorage::set(key, value).map_err(|err| {
            tracing::warn!(%key, "local storage write failed: {err}");
            StorageError::Backend(err.to_string())
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        use gloo_storage::{LocalStorage, Storage};

        LocalStorage::delete(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        use gloo_storage::{LocalStorage, Storage};

        let raw = LocalStorage::raw();
        let length = raw
            .length()
            .map_err(|err| StorageError::Backend(format!("{err:?}")))?;
        let mut keys = Vec::with_capacity(length as usize);
        for index in 0..length {
            if let Ok(Some(key)) = raw.key(index) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// In-memory store for tests and for environments without `localStorage`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_round_trip_through_memory_store() {
        let store = MemoryStore::new();
        save(&store, THEME_KEY, "dark").unwrap();
        let theme: Option<String> = load(&store, THEME_KEY).unwrap();
        assert_eq!(theme.as_deref(), Some("dark"));
    }

    #[test]
    fn missing_key_loads_as_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<String>> = load(&store, SAVED_RULES_KEY).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn malformed_value_reports_key() {
        let store = MemoryStore::new();
        store.set(SAVED_QR_CODES_KEY, &json!({"not": "a list"})).unwrap();
        let err = load::<Vec<String>, _>(&store, SAVED_QR_CODES_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { ref key, .. } if key == SAVED_QR_CODES_KEY));
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("a", &json!(1)).unwrap();
        assert_eq!(other.keys().unwrap(), vec!["a".to_string()]);
        other.delete("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }
}
