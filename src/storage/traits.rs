//! Storage substrate traits for GradePal.
//!
//! This module defines the `KeyValueStore` trait: a durable string store
//! addressed by key, used to persist the serialized course collection.

use std::sync::Arc;

use crate::error::Result;

/// Trait for key-value storage backends.
///
/// Values are opaque text. The course store treats every backend as
/// best-effort durability, never as a source of truth for a running session.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn remove(&self, key: &str) -> Result<()>;

    /// Check if a value is stored under `key`.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Blanket implementation of KeyValueStore for Arc-wrapped stores.
///
/// Lets a test keep a handle on the backend it hands to a `CourseStore`.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Test utilities for KeyValueStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;

    /// Test helper to verify KeyValueStore implementations.
    pub fn test_key_value_store_contract<S: KeyValueStore>(store: &S) {
        let key = "gradepal-test";

        // Initially absent
        assert!(!store.contains(key).unwrap());
        assert!(store.get(key).unwrap().is_none());

        store.set(key, "[]").unwrap();
        assert!(store.contains(key).unwrap());
        assert_eq!(store.get(key).unwrap().as_deref(), Some("[]"));

        // Overwrite replaces the whole value
        store.set(key, r#"[{"id":"c1"}]"#).unwrap();
        assert_eq!(store.get(key).unwrap().as_deref(), Some(r#"[{"id":"c1"}]"#));

        // Other keys are independent
        assert!(store.get("other-key").unwrap().is_none());

        store.remove(key).unwrap();
        assert!(!store.contains(key).unwrap());

        // Removing again should succeed
        store.remove(key).unwrap();
    }
}
