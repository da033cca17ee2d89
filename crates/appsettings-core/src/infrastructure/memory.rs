//! In-memory settings store.
//!
//! Holds entries in insertion order and counts calls to `save()`.  Useful for
//! tests and for config types that synthesize a document instead of reading
//! one from disk.

use crate::domain::store::{SettingsStore, StoreError};

/// A [`SettingsStore`] backed by a `Vec` of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    save_count: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Number of times [`SettingsStore::save`] has been called.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl FromIterator<(String, String)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.add(&key, &value);
        }
        store
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn all_keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn add(&mut self, key: &str, value: &str) {
        if self.entries.iter().all(|(k, _)| k != key) {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    fn remove_by_prefix(&mut self, prefix: &str) {
        self.entries.retain(|(k, _)| !k.contains(prefix));
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.save_count += 1;
        Ok(())
    }
}
