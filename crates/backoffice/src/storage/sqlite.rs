use std::path::Path;

use super::KeyValueStore;
use crate::db::{kv_repo, Database};
use crate::error::StorageError;

/// Store persisted in SQLite, scoped to one namespace.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    namespace: String,
}

impl SqliteStore {
    pub fn new(db: Database, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self, StorageError> {
        Ok(Self::new(Database::open(path)?, namespace))
    }

    pub fn in_memory(namespace: impl Into<String>) -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_in_memory()?, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(kv_repo::get(&self.db, &self.namespace, key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(kv_repo::put(&self.db, &self.namespace, key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        kv_repo::delete(&self.db, &self.namespace, key)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(kv_repo::keys(&self.db, &self.namespace)?)
    }
}
