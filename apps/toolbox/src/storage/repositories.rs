use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    load, save, KeyValueStore, StorageError, StorageResult, COMPONENT_THEME_PREFIX,
    INSTALL_DISMISSED_KEY, THEME_KEY,
};

/// Anything stored in a flat JSON list and addressed by id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;
}

/// A JSON array of records under one storage key.
pub struct RecordList<S, T> {
    store: S,
    key: &'static str,
    _marker: std::marker::PhantomData<T>,
}

impl<S, T> RecordList<S, T>
where
    S: KeyValueStore,
    T: Record,
{
    pub fn new(store: S, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn list(&self) -> StorageResult<Vec<T>> {
        Ok(load::<Vec<T>, _>(&self.store, self.key)?.unwrap_or_default())
    }

    pub fn get(&self, id: &str) -> StorageResult<T> {
        self.list()?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Replaces the record with the same id, or appends it.
    pub fn upsert(&self, record: T) -> StorageResult<Vec<T>> {
        let mut records = self.list()?;
        match records.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        save(&self.store, self.key, &records)?;
        Ok(records)
    }

    pub fn delete(&self, id: &str) -> StorageResult<Vec<T>> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        save(&self.store, self.key, &records)?;
        Ok(records)
    }

    /// Merges imported records by id; returns how many were new.
    pub fn import(&self, incoming: Vec<T>) -> StorageResult<usize> {
        let mut records = self.list()?;
        let mut added = 0;
        for record in incoming {
            match records.iter_mut().find(|existing| existing.id() == record.id()) {
                Some(existing) => *existing = record,
                None => {
                    records.push(record);
                    added += 1;
                }
            }
        }
        save(&self.store, self.key, &records)?;
        Ok(added)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Global and per-tool theme plus small UI flags.
pub struct ThemeRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ThemeRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn theme(&self) -> StorageResult<Theme> {
        Ok(load(&self.store, THEME_KEY)?.unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> StorageResult<()> {
        save(&self.store, THEME_KEY, &theme)
    }

    /// Per-tool override, falling back to the global theme.
    pub fn component_theme(&self, component: &str) -> StorageResult<Theme> {
        match load(&self.store, &component_theme_key(component))? {
            Some(theme) => Ok(theme),
            None => self.theme(),
        }
    }

    pub fn set_component_theme(&self, component: &str, theme: Option<Theme>) -> StorageResult<()> {
        let key = component_theme_key(component);
        match theme {
            Some(theme) => save(&self.store, &key, &theme),
            None => self.store.delete(&key),
        }
    }

    pub fn component_overrides(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(COMPONENT_THEME_PREFIX).map(str::to_string))
            .collect())
    }

    pub fn install_hint_dismissed(&self) -> StorageResult<bool> {
        Ok(load(&self.store, INSTALL_DISMISSED_KEY)?.unwrap_or(false))
    }

    pub fn dismiss_install_hint(&self) -> StorageResult<()> {
        save(&self.store, INSTALL_DISMISSED_KEY, &true)
    }
}

fn component_theme_key(component: &str) -> String {
    format!("{COMPONENT_THEME_PREFIX}{component}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Record for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.into(),
            body: body.into(),
        }
    }

    #[test]
    fn upsert_replaces_by_id() {
        let list = RecordList::<_, Note>::new(MemoryStore::new(), "notes");
        list.upsert(note("a", "first")).unwrap();
        list.upsert(note("b", "second")).unwrap();
        let records = list.upsert(note("a", "edited")).unwrap();
        assert_eq!(records, vec![note("a", "edited"), note("b", "second")]);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let list = RecordList::<_, Note>::new(MemoryStore::new(), "notes");
        list.upsert(note("a", "first")).unwrap();
        assert!(matches!(list.delete("zzz"), Err(StorageError::NotFound(_))));
        assert!(list.delete("a").unwrap().is_empty());
    }

    #[test]
    fn import_counts_only_new_records() {
        let list = RecordList::<_, Note>::new(MemoryStore::new(), "notes");
        list.upsert(note("a", "first")).unwrap();
        let added = list
            .import(vec![note("a", "replaced"), note("c", "third")])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(list.get("a").unwrap().body, "replaced");
    }

    #[test]
    fn component_theme_falls_back_to_global() {
        let prefs = ThemeRepository::new(MemoryStore::new());
        prefs.set_theme(Theme::Dark).unwrap();
        assert_eq!(prefs.component_theme("qr-code").unwrap(), Theme::Dark);

        prefs
            .set_component_theme("qr-code", Some(Theme::Light))
            .unwrap();
        assert_eq!(prefs.component_theme("qr-code").unwrap(), Theme::Light);
        assert_eq!(prefs.component_overrides().unwrap(), vec!["qr-code".to_string()]);

        prefs.set_component_theme("qr-code", None).unwrap();
        assert_eq!(prefs.component_theme("qr-code").unwrap(), Theme::Dark);
    }

    #[test]
    fn install_hint_flag_persists() {
        let store = MemoryStore::new();
        let prefs = ThemeRepository::new(store.clone());
        assert!(!prefs.install_hint_dismissed().unwrap());
        prefs.dismiss_install_hint().unwrap();
        assert!(ThemeRepository::new(store).install_hint_dismissed().unwrap());
    }
}
