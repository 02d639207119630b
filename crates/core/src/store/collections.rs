//! Typed access to the stored collections.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{CollectionKey, Store, StoreError};
use crate::ledger::types::{Deposit, Member, Settings, Withdrawal};
use crate::session::User;

/// Reads and writes whole collections as JSON over a [`Store`].
///
/// Absent keys read as an empty collection, default settings, or no session.
/// Text that is present but does not decode is reported as
/// [`StoreError::Corrupt`], never silently treated as empty.
#[derive(Debug)]
pub struct Collections<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Collections<'a, S> {
    /// Wraps a store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All members in insertion order.
    pub fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.list(CollectionKey::Members)
    }

    /// Replaces the member collection.
    pub fn save_members(&self, members: &[Member]) -> Result<(), StoreError> {
        self.save(CollectionKey::Members, members)
    }

    /// All deposits in insertion order.
    pub fn deposits(&self) -> Result<Vec<Deposit>, StoreError> {
        self.list(CollectionKey::Deposits)
    }

    /// Replaces the deposit collection.
    pub fn save_deposits(&self, deposits: &[Deposit]) -> Result<(), StoreError> {
        self.save(CollectionKey::Deposits, deposits)
    }

    /// All withdrawals in insertion order.
    pub fn withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        self.list(CollectionKey::Withdrawals)
    }

    /// Replaces the withdrawal collection.
    pub fn save_withdrawals(&self, withdrawals: &[Withdrawal]) -> Result<(), StoreError> {
        self.save(CollectionKey::Withdrawals, withdrawals)
    }

    /// The settings record, or defaults when none is stored.
    pub fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self.load(CollectionKey::Settings)?.unwrap_or_default())
    }

    /// Replaces the settings record.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save(CollectionKey::Settings, settings)
    }

    /// The session marker, if any.
    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        self.load(CollectionKey::User)
    }

    /// Writes the session marker.
    pub fn save_current_user(&self, user: &User) -> Result<(), StoreError> {
        self.save(CollectionKey::User, user)
    }

    /// Removes the session marker.
    pub fn clear_current_user(&self) -> Result<(), StoreError> {
        self.store.remove(CollectionKey::User)
    }

    fn list<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Vec<T>, StoreError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Option<T>, StoreError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Corrupt { key, source }),
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: CollectionKey, value: &T) -> Result<(), StoreError> {
        let text =
            serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.store.set(key, &text)
    }
}
