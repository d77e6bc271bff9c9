//! Filesystem document store.
//!
//! Provides [`FsStore`] for keeping one pretty-printed JSON document per file.

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use serde_json::Value;
use tempfile::Builder;

use crate::storage::{DocumentStore, JsonObject, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem document store.
///
/// Documents are written to a temporary file next to the target and renamed
/// into place, so a failed write never leaves a truncated document behind.
/// New documents get the mode a plain create would (`0o666` less the umask).
/// Replacing a document keeps its existing permissions.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use quill_storage::{DocumentStore, FsStore};
///
/// let store = FsStore::new();
/// let doc = store.read(Path::new("data/articles/2019/02/07/hello.json"))?;
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    /// Create a new filesystem store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStore for FsStore {
    fn read(&self, path: &Path) -> Result<JsonObject, StorageError> {
        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(_) => Err(StorageError::new(StorageErrorKind::InvalidDocument)
                .with_path(path)
                .with_backend(BACKEND)),
            Err(e) => Err(StorageError::invalid_document(e, path).with_backend(BACKEND)),
        }
    }

    fn write(&self, path: &Path, document: &JsonObject) -> Result<(), StorageError> {
        let io_err = |e: std::io::Error| {
            StorageError::io(e, path).with_backend(BACKEND)
        };

        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        };
        fs::create_dir_all(parent).map_err(io_err)?;

        let mut builder = Builder::new();
        #[cfg(unix)]
        builder.permissions(fs::Permissions::from_mode(0o666));
        let mut file = builder.tempfile_in(parent).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut file, document)
            .map_err(|e| StorageError::invalid_document(e, path).with_backend(BACKEND))?;
        file.write_all(b"\n").map_err(io_err)?;
        if let Ok(existing) = fs::metadata(path) {
            file.as_file()
                .set_permissions(existing.permissions())
                .map_err(io_err)?;
        }
        file.persist(path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %path.display(), "Wrote document");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path)
            .map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;

        tracing::debug!(path = %path.display(), "Removed document");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
