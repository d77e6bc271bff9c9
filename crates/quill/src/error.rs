//! CLI error types.

use quill_config::ConfigError;
use quill_post::PostError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{}", describe(.0))]
    Post(#[from] PostError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 2 for a rejected request, 3 for a missing post,
    /// 1 for anything else.
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Post(
                PostError::InvalidPath(_) | PostError::NotFound(_),
            ) => 3,
            Self::Post(
                PostError::UnrecognisedDestination(_)
                | PostError::UnrecognisedType(_)
                | PostError::DuplicateCreate(_)
                | PostError::InvalidUpdate(_)
                | PostError::InvalidCreate
                | PostError::InvalidTypeHint(_)
                | PostError::InvalidPublished(_)
                | PostError::InvalidUrl { .. },
            )
            | Self::Json(_) => 2,
            _ => 1,
        }
    }
}

/// User-facing text for a post error.
fn describe(err: &PostError) -> String {
    match err {
        PostError::UnrecognisedDestination(uid) => {
            format!("'{uid}' is not a configured destination")
        }
        PostError::UnrecognisedType(kind) => {
            format!("posts of type '{kind}' cannot be stored")
        }
        PostError::DuplicateCreate(_) => "a post already exists at this location".to_owned(),
        PostError::InvalidPath(url) => format!("no post found at {url}"),
        PostError::InvalidCreate => {
            "submission needs either an 'h' or a 'properties' key".to_owned()
        }
        PostError::InvalidTypeHint(hint) => {
            format!("'{hint}' is not supported, only h-entry posts can be created")
        }
        other => other.to_string(),
    }
}
