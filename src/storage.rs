//! Key/value storage collaborator.
//!
//! Backends return `Result` so failures can be told apart from absent keys.
//! Controllers only ever see [`Store`], which swallows and logs every failure:
//! a read that fails yields `None`, a write that fails is a no-op.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// A string key/value backend such as `localStorage`.
pub trait Storage {
    /// # Errors
    ///
    /// Returns `Err` when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `Err` when the backend refuses the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory backend. Clones share the same items, which lets a test keep a
/// handle across a simulated page reload.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    available: bool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Rc::new(RefCell::new(HashMap::new())), available: true }
    }

    /// A backend whose every call fails, like storage in a locked-down browser.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { available: false, ..Self::new() }
    }

    /// Read a key directly, bypassing availability.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Failure-swallowing facade over a [`Storage`] backend.
pub struct Store {
    backend: Box<dyn Storage>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    #[must_use]
    pub fn new(backend: Box<dyn Storage>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("storage read of {key:?} failed: {err}");
                None
            }
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            log::warn!("storage write of {key:?} failed: {err}");
        }
    }

    /// Load a JSON value for `key`; absent, unreadable, or malformed ⇒ `None`.
    #[must_use]
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("stored {key:?} is not valid JSON: {err}");
                None
            }
        }
    }

    /// Save a JSON value for `key`.
    pub fn save_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(err) => log::warn!("could not serialise {key:?}: {err}"),
        }
    }
}
