//! Document store trait and error types.
//!
//! Provides the core [`DocumentStore`] trait for reading, writing and removing
//! JSON documents, along with [`StorageError`] for unified error handling
//! across backends.
//!
//! # Path Convention
//!
//! All path parameters are **filesystem paths** of the document itself
//! (e.g. `/srv/blog/articles/2019/02/07/hello.json`). Mapping posts and URLs
//! to these paths is the caller's concern.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// A stored document: one top-level JSON object.
pub type JsonObject = Map<String, Value>;

/// What went wrong with a document, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// No document at the path.
    NotFound,
    PermissionDenied,
    /// The path cannot hold a document (e.g. it has no parent directory).
    InvalidPath,
    /// The file exists but is not a JSON object.
    InvalidDocument,
    Other,
}

impl StorageErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::NotFound => "document not found",
            Self::PermissionDenied => "permission denied",
            Self::InvalidPath => "invalid document path",
            Self::InvalidDocument => "invalid document",
            Self::Other => "storage failure",
        }
    }
}

impl From<std::io::ErrorKind> for StorageErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::IsADirectory => {
                Self::InvalidPath
            }
            _ => Self::Other,
        }
    }
}

/// A document store failure.
///
/// Built up from a [`StorageErrorKind`] with optional context: the document
/// path, the backend that failed and the underlying cause.
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub path: Option<PathBuf>,
    /// Short backend name, e.g. `"Fs"`.
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_backend(self, backend: &'static str) -> Self {
        Self {
            backend: Some(backend),
            ..self
        }
    }

    #[must_use]
    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    /// The underlying cause, if it is an `E`.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref()?.downcast_ref()
    }

    /// Whether this error reports a missing document.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }

    /// No document at `path`.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// An I/O failure on the document at `path`, classified by its kind.
    #[must_use]
    pub fn io(err: std::io::Error, path: &Path) -> Self {
        Self::new(err.kind().into()).with_path(path).with_source(err)
    }

    /// The document at `path` could not be parsed or encoded.
    #[must_use]
    pub fn invalid_document(err: serde_json::Error, path: &Path) -> Self {
        Self::new(StorageErrorKind::InvalidDocument)
            .with_path(path)
            .with_source(err)
    }
}

impl std::fmt::Display for StorageError {
    // "Fs: document not found at /a.json (No such file or directory)"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "{backend}: ")?;
        }
        f.write_str(self.kind.label())?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path.display())?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction for post documents.
///
/// Implementations assume a single writer per path. Nothing here locks across
/// processes; concurrent writers to the same path race and the last write wins.
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no document exists at `path`,
    /// [`StorageErrorKind::InvalidDocument`] if it is not a JSON object, and
    /// other kinds for I/O failures.
    fn read(&self, path: &Path) -> Result<JsonObject, StorageError>;

    /// Write `document` to `path`, creating intermediate directories.
    ///
    /// A failed write leaves either the previous document or no document at
    /// `path`, never a truncated one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directories or the document cannot be
    /// written.
    fn write(&self, path: &Path, document: &JsonObject) -> Result<(), StorageError>;

    /// Remove the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if there is nothing to remove.
    fn delete(&self, path: &Path) -> Result<(), StorageError>;

    /// Whether a document exists at `path`. Errors count as absent.
    fn exists(&self, path: &Path) -> bool;
}
