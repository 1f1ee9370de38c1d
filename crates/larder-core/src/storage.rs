//! Key-value storage backends for persistent cells.
//!
//! Storage is scoped per key with no transactions and no expiry. Two backends
//! are provided: [`SqliteStore`] for the application and [`MemoryStore`] for
//! tests and throwaway sessions.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{db::Database, error::Result};

/// Persistent storage consumed by [`crate::cell::PersistentCell`].
pub trait KeyValueStore: Send + Sync {
    /// Returns the serialized value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed storage. A single connection is shared behind a mutex.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Opens (and creates, when needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::new(path)?;
        Ok(Self { db: Mutex::new(db) })
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::in_memory()?),
        })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.db().get_value(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.db().put_value(key, value)
    }
}

/// In-memory storage.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
