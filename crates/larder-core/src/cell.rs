//! A value mirrored into one key of persistent storage.

use std::{fmt, sync::Arc};

use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::{error::Result, storage::KeyValueStore};

/// In-memory value kept in sync with a named storage slot.
///
/// Loading never fails: a missing key, a storage error or a value that no
/// longer deserializes all fall back to the default. Every update is
/// serialized and written before it returns, and the in-memory value only
/// changes once the write has succeeded.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use larder_core::{cell::PersistentCell, storage::MemoryStore};
///
/// let storage = Arc::new(MemoryStore::new());
/// let mut cell = PersistentCell::load(storage.clone(), "counter", 0u32);
/// cell.update(|n| n + 1)?;
///
/// let reloaded = PersistentCell::load(storage, "counter", 0u32);
/// assert_eq!(*reloaded.get(), 1);
/// # Result::<(), larder_core::LarderError>::Ok(())
/// ```
pub struct PersistentCell<T> {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> PersistentCell<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads `key` from storage, or uses `default` when it cannot.
    pub fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match storage.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Ignoring unreadable value stored under '{key}': {e}");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to read '{key}' from storage, using default: {e}");
                default
            }
        };

        Self {
            storage,
            key,
            value,
        }
    }

    /// Storage key of this cell.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value and writes it to storage.
    pub fn set(&mut self, value: T) -> Result<()> {
        let raw = serde_json::to_string(&value)?;
        self.storage.write(&self.key, &raw)?;
        self.value = value;
        Ok(())
    }

    /// Computes the new value from the current one and writes it to storage.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentCell")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{error::LarderError, storage::MemoryStore};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(LarderError::Storage {
                message: "unavailable".to_string(),
            })
        }

        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(LarderError::Storage {
                message: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_missing_key_uses_default() {
        let cell = PersistentCell::load(Arc::new(MemoryStore::new()), "missing", vec![1, 2]);
        assert_eq!(cell.get(), &vec![1, 2]);
        assert_eq!(cell.key(), "missing");
    }

    #[test]
    fn test_corrupt_value_uses_default() {
        let storage = Arc::new(MemoryStore::new());
        storage.write("users", "{not json").unwrap();

        let cell: PersistentCell<BTreeMap<String, String>> =
            PersistentCell::load(storage, "users", BTreeMap::new());
        assert!(cell.get().is_empty());
    }

    #[test]
    fn test_wrong_shape_uses_default() {
        let storage = Arc::new(MemoryStore::new());
        storage.write("list", r#"{"a":1}"#).unwrap();

        let cell: PersistentCell<Vec<u32>> = PersistentCell::load(storage, "list", vec![]);
        assert!(cell.get().is_empty());
    }

    #[test]
    fn test_read_error_uses_default() {
        let cell = PersistentCell::load(Arc::new(FailingStore), "k", 7u8);
        assert_eq!(*cell.get(), 7);
    }

    #[test]
    fn test_set_writes_through() {
        let storage = Arc::new(MemoryStore::new());
        let mut cell = PersistentCell::load(storage.clone(), "name", String::new());
        cell.set("basil".to_string()).unwrap();

        assert_eq!(storage.read("name").unwrap().as_deref(), Some("\"basil\""));
    }

    #[test]
    fn test_update_composes_with_current_value() {
        let storage = Arc::new(MemoryStore::new());
        let mut cell = PersistentCell::load(storage.clone(), "list", vec!["a".to_string()]);
        cell.update(|old| {
            let mut next = old.clone();
            next.push("b".to_string());
            next
        })
        .unwrap();
        cell.update(|old| {
            let mut next = old.clone();
            next.push("c".to_string());
            next
        })
        .unwrap();

        let reloaded = PersistentCell::load(storage, "list", Vec::<String>::new());
        assert_eq!(reloaded.get(), &vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_write_keeps_old_value() {
        let mut cell = PersistentCell::load(Arc::new(FailingStore), "k", 1u8);
        assert!(cell.set(2).is_err());
        assert_eq!(*cell.get(), 1);
    }
}
