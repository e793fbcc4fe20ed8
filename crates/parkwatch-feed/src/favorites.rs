//! Persistence for the favorite facility names.

use std::sync::Arc;

use parkwatch_core::FavoriteSet;

use crate::error::StorageError;
use crate::store::KvStore;

/// Storage key for the favorites list.
pub const FAVORITES_KEY: &str = "parking-favorites";

/// Reads and writes a [`FavoriteSet`] as a JSON list of names.
pub struct FavoriteStore<S> {
    store: Arc<S>,
}

impl<S> Clone for FavoriteStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KvStore> FavoriteStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Write an empty list if nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store cannot be read or written.
    pub fn ensure_initialized(&self) -> Result<(), StorageError> {
        if self.store.get(FAVORITES_KEY)?.is_none() {
            self.save(&FavoriteSet::default())?;
        }
        Ok(())
    }

    /// Current favorites. An unreadable or corrupt list reads as empty.
    #[must_use]
    pub fn load(&self) -> FavoriteSet {
        match self.store.get(FAVORITES_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(names) => FavoriteSet::from_names(names),
                Err(e) => {
                    tracing::warn!(stage = "favorites", error = %e, "favorites list is corrupt; treating as empty");
                    FavoriteSet::default()
                }
            },
            Ok(None) => FavoriteSet::default(),
            Err(e) => {
                tracing::warn!(stage = "favorites", error = %e, "favorites read failed");
                FavoriteSet::default()
            }
        }
    }

    /// Add `name`; returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the updated list cannot be written.
    pub fn add(&self, name: &str) -> Result<bool, StorageError> {
        let mut set = self.load();
        let changed = set.add(name);
        if changed {
            self.save(&set)?;
        }
        Ok(changed)
    }

    /// Remove `name`; returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the updated list cannot be written.
    pub fn remove(&self, name: &str) -> Result<bool, StorageError> {
        let mut set = self.load();
        let changed = set.remove(name);
        if changed {
            self.save(&set)?;
        }
        Ok(changed)
    }

    fn save(&self, set: &FavoriteSet) -> Result<(), StorageError> {
        let text = serde_json::to_string(set)?;
        self.store.set(FAVORITES_KEY, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn favorites() -> (Arc<MemoryStore>, FavoriteStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), FavoriteStore::new(store))
    }

    #[test]
    fn initializes_to_an_empty_list_once() {
        let (store, favorites) = favorites();
        favorites.ensure_initialized().unwrap();
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));

        favorites.add("City Lot 1").unwrap();
        favorites.ensure_initialized().unwrap();
        assert_eq!(favorites.load().names(), ["City Lot 1"]);
    }

    #[test]
    fn add_and_remove_persist_in_order() {
        let (store, favorites) = favorites();
        assert!(favorites.add("B").unwrap());
        assert!(favorites.add("A").unwrap());
        assert!(!favorites.add("B").unwrap());
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[\"B\",\"A\"]"));

        assert!(favorites.remove("B").unwrap());
        assert!(!favorites.remove("B").unwrap());
        assert_eq!(favorites.load().names(), ["A"]);
    }

    #[test]
    fn corrupt_list_reads_as_empty() {
        let (store, favorites) = favorites();
        store.set(FAVORITES_KEY, "{\"oops\":1}").unwrap();
        assert!(favorites.load().is_empty());
        assert!(favorites.add("A").unwrap());
        assert_eq!(favorites.load().names(), ["A"]);
    }
}
