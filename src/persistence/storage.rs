//! Key-value storage capability
//!
//! Backends only implement raw string get/set/remove. Typed helpers on top
//! never fail loudly: missing or malformed values read back as `None` or the
//! supplied default.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable")]
    Unavailable,
    #[error("Storage error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value storage (LocalStorage semantics)
pub trait KeyValueStore {
    /// Raw value under `key`, `Ok(None)` when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (e.g. quota).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Parse the JSON value under `key`
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.get_item(key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring malformed '{}': {}", key, e);
                None
            }
        }
    }

    fn get_json_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_json(key).unwrap_or(default)
    }

    /// Serialize `value` as JSON under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.set_item(key, &json)
    }

    /// Numeric value under `key`, `default` when missing or not a number
    fn get_number(&self, key: &str, default: f64) -> f64 {
        match self.get_item(key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: &str, value: impl ToString) -> Result<(), StorageError> {
        self.set_item(key, &value.to_string())
    }

    /// Remove `key`, logging (not returning) failures
    fn remove(&self, key: &str) {
        if let Err(e) = self.remove_item(key) {
            log::warn!("Failed to remove '{}': {}", key, e);
        }
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
