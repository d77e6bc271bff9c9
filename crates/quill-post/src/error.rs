//! Error taxonomy for the post lifecycle.

use std::path::PathBuf;

use quill_storage::StorageError;

/// Every failure the post lifecycle can report.
///
/// The boundary layer maps each variant to a protocol-specific response;
/// variants carry the offending identifier for message construction.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// A destination override or URL matched no configured destination.
    #[error("unrecognised destination: {0}")]
    UnrecognisedDestination(String),

    /// The registry was built without any destination.
    #[error("no destinations configured")]
    NoDestinations,

    /// The classifier returned a type with no strategy.
    #[error("the type '{0}' is not recognised")]
    UnrecognisedType(String),

    /// Create targeted a path that already holds a document.
    #[error("an entry already exists at {}", .0.display())]
    DuplicateCreate(PathBuf),

    /// No document exists at the given path.
    #[error("no document at {}", .0.display())]
    NotFound(PathBuf),

    /// A URL-addressed lookup resolved to a missing document.
    #[error("no post found for {0}")]
    InvalidPath(String),

    /// An update section has the wrong shape.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// Submission matches neither create encoding.
    #[error("no recognisable parameters for entry creation")]
    InvalidCreate,

    /// Submission names a type other than `h-entry`.
    #[error("unsupported type hint '{0}'")]
    InvalidTypeHint(String),

    /// The `published` property cannot be parsed as a timestamp.
    #[error("invalid published timestamp '{0}'")]
    InvalidPublished(String),

    /// A URL could not be parsed, joined or mapped to a path.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// Any other document store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PostError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
