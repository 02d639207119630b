//! Key-value persistence for the fund's collections.
//!
//! Every collection lives under a stable key and round-trips through JSON
//! text on each write, the same way a browser's local storage would hold it.
//! The [`Store`] trait is the injection point: the ledger, query layer, and
//! session gate only ever see a `Store`, so tests run against
//! [`MemoryStore`] and the binary runs against a file-backed store.
//!
//! # Modules
//!
//! - `collections` - Typed JSON access to each collection
//! - `error` - Storage error types
//! - `memory` - In-memory store

mod collections;
mod error;
mod memory;

use std::sync::Arc;

pub use collections::Collections;
pub use error::StoreError;
pub use memory::MemoryStore;

/// Named collections held by a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    /// Member records.
    Members,
    /// Deposit records.
    Deposits,
    /// Withdrawal records.
    Withdrawals,
    /// The single settings record.
    Settings,
    /// The optional current-user session marker.
    User,
}

impl CollectionKey {
    /// Every key, in a fixed order.
    pub const ALL: [Self; 5] = [
        Self::Members,
        Self::Deposits,
        Self::Withdrawals,
        Self::Settings,
        Self::User,
    ];

    /// Returns the stable storage key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Members => "fund_management_members",
            Self::Deposits => "fund_management_deposits",
            Self::Withdrawals => "fund_management_withdrawals",
            Self::Settings => "fund_management_settings",
            Self::User => "fund_management_user",
        }
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-level key-value store.
///
/// An absent key reads as `None`; callers decide what "absent" means for
/// each collection. Implementations use interior mutability so one store
/// can be shared by the ledger engine and the session gate.
pub trait Store: Send + Sync {
    /// Reads the raw text stored under `key`.
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError>;

    /// Replaces the text stored under `key`.
    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove(&self, key: CollectionKey) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: CollectionKey) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: CollectionKey) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: CollectionKey) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
