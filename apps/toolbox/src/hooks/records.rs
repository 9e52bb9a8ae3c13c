use dioxus::prelude::*;
use tracing::{info, warn};

use crate::state::{use_app_actions, AppActions};
use crate::storage::{LocalStore, Record, RecordList};

/// A saved-record list mirrored into a signal. Every mutation writes
/// through to local storage first and refreshes the signal from the
/// result.
pub struct RecordsHandle<T: 'static> {
    open: fn(LocalStore) -> RecordList<LocalStore, T>,
    label: &'static str,
    actions: AppActions,
    pub records: Signal<Vec<T>>,
}

impl<T: 'static> Clone for RecordsHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for RecordsHandle<T> {}

impl<T: Record + 'static> RecordsHandle<T> {
    fn repository(&self) -> RecordList<LocalStore, T> {
        (self.open)(LocalStore)
    }

    pub fn save(&self, record: T, message: String) {
        match self.repository().upsert(record) {
            Ok(records) => {
                let mut signal = self.records;
                signal.set(records);
                self.actions.set_operation_success(message);
            }
            Err(err) => self.actions.record_failure(format!("Saving {}", self.label), err),
        }
    }

    pub fn delete(&self, id: &str) {
        match self.repository().delete(id) {
            Ok(records) => {
                let mut signal = self.records;
                signal.set(records);
                info!(list = self.label, %id, "record deleted");
            }
            Err(err) => self.actions.record_failure(format!("Deleting from {}", self.label), err),
        }
    }

    /// Returns how many of `incoming` were new.
    pub fn import(&self, incoming: Vec<T>) -> Option<usize> {
        let repository = self.repository();
        let result = repository
            .import(incoming)
            .and_then(|added| repository.list().map(|records| (added, records)));
        match result {
            Ok((added, records)) => {
                let mut signal = self.records;
                signal.set(records);
                Some(added)
            }
            Err(err) => {
                self.actions.record_failure(format!("Importing {}", self.label), err);
                None
            }
        }
    }
}

pub fn use_records<T: Record + 'static>(
    open: fn(LocalStore) -> RecordList<LocalStore, T>,
    label: &'static str,
) -> RecordsHandle<T> {
    let actions = use_app_actions();
    let records = use_signal(|| match open(LocalStore).list() {
        Ok(records) => records,
        Err(err) => {
            warn!(list = label, error = %err, "discarding unreadable saved records");
            Vec::new()
        }
    });
    RecordsHandle {
        open,
        label,
        actions,
        records,
    }
}
