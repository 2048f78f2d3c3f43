//! Spec store trait, configuration, and in-memory store.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fcommon::{BoxFuture, SpecId};

use crate::error::StoreError;
use crate::types::{NewSpec, StoredSpec};

pub use crate::backends::filesystem::{FilesystemSpecStore, default_filesystem_root};
pub use crate::backends::sqlite::{SqliteSpecStore, default_sqlite_path};

/// Persistence boundary for uploaded OpenAPI documents.
///
/// `list` returns specs in creation order. `delete` of an unknown id succeeds.
pub trait SpecStore: Send + Sync {
    fn create<'a>(&'a self, spec: NewSpec) -> BoxFuture<'a, Result<StoredSpec, StoreError>>;

    fn find<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<Option<StoredSpec>, StoreError>>;

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StoredSpec>, StoreError>>;

    fn delete<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<(), StoreError>>;
}

pub(crate) fn new_spec_id() -> SpecId {
    SpecId::new(uuid::Uuid::new_v4().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    Filesystem { root: PathBuf },
    InMemory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_spec_store(config: StoreConfig) -> Result<Arc<dyn SpecStore>, StoreError> {
    match config {
        StoreConfig::Sqlite { path } => Ok(Arc::new(SqliteSpecStore::new(path)?)),
        StoreConfig::Filesystem { root } => Ok(Arc::new(FilesystemSpecStore::new(root)?)),
        StoreConfig::InMemory => Ok(Arc::new(InMemorySpecStore::new())),
    }
}

pub fn create_default_spec_store() -> Result<Arc<dyn SpecStore>, StoreError> {
    create_spec_store(StoreConfig::default())
}

#[derive(Debug, Default)]
pub struct InMemorySpecStore {
    specs: Mutex<Vec<StoredSpec>>,
}

impl InMemorySpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn specs(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredSpec>>, StoreError> {
        self.specs
            .lock()
            .map_err(|_| StoreError::storage("in-memory store lock poisoned"))
    }
}

impl SpecStore for InMemorySpecStore {
    fn create<'a>(&'a self, spec: NewSpec) -> BoxFuture<'a, Result<StoredSpec, StoreError>> {
        Box::pin(async move {
            spec.validate()?;
            let stored = StoredSpec::from_new(new_spec_id(), spec);
            self.specs()?.push(stored.clone());
            Ok(stored)
        })
    }

    fn find<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<Option<StoredSpec>, StoreError>> {
        Box::pin(async move { Ok(self.specs()?.iter().find(|spec| &spec.id == id).cloned()) })
    }

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StoredSpec>, StoreError>> {
        Box::pin(async move { Ok(self.specs()?.clone()) })
    }

    fn delete<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.specs()?.retain(|spec| &spec.id != id);
            Ok(())
        })
    }
}
