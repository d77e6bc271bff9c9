//! Mock document store for testing.
//!
//! Provides [`MockStore`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{DocumentStore, JsonObject, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock document store for testing.
///
/// Keeps documents in memory. Use the builder methods to seed it with test
/// data and [`MockStore::fail_writes`] to simulate a failing backend.
///
/// # Example
///
/// ```ignore
/// use quill_storage::{DocumentStore, MockStore};
///
/// let store = MockStore::new().with_document("/data/notes/2019/02/07/123456.json", doc);
/// assert!(store.exists(Path::new("/data/notes/2019/02/07/123456.json")));
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    documents: RwLock<HashMap<PathBuf, JsonObject>>,
    writes: RwLock<Vec<PathBuf>>,
    fail_writes: RwLock<bool>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, path: impl Into<PathBuf>, document: JsonObject) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(path.into(), document);
        self
    }

    /// Make every subsequent write fail with [`StorageErrorKind::Other`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap() = fail;
    }

    /// Document currently stored at `path`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn document(&self, path: &Path) -> Option<JsonObject> {
        self.documents.read().unwrap().get(path).cloned()
    }

    /// Paths written so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.read().unwrap().clone()
    }
}

impl DocumentStore for MockStore {
    fn read(&self, path: &Path) -> Result<JsonObject, StorageError> {
        self.documents
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, document: &JsonObject) -> Result<(), StorageError> {
        if *self.fail_writes.read().unwrap() {
            return Err(StorageError::new(StorageErrorKind::Other)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.documents
            .write()
            .unwrap()
            .insert(path.to_path_buf(), document.clone());
        self.writes.write().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<(), StorageError> {
        self.documents
            .write()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.documents.read().unwrap().contains_key(path)
    }
}
