//! In-memory store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{CollectionKey, Store, StoreError};

/// A [`Store`] that keeps every collection in process memory.
///
/// Nothing survives the process. Used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<CollectionKey, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<CollectionKey, String> {
        self.entries.read().clone()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(&key).cloned())
    }

    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CollectionKey) -> Result<(), StoreError> {
        self.entries.write().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_reads_none() {
        let store = MemoryStore::new();
        assert!(store.get(CollectionKey::Members).unwrap().is_none());
    }

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set(CollectionKey::Deposits, "[]").unwrap();
        assert_eq!(
            store.get(CollectionKey::Deposits).unwrap().as_deref(),
            Some("[]")
        );

        store.remove(CollectionKey::Deposits).unwrap();
        assert!(store.get(CollectionKey::Deposits).unwrap().is_none());

        // removing again is fine
        store.remove(CollectionKey::Deposits).unwrap();
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = MemoryStore::new();
        store.set(CollectionKey::User, "{}").unwrap();
        let snapshot = store.snapshot();
        store.remove(CollectionKey::User).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(store.snapshot().is_empty());
    }
}
