//! Library Error Types
//!
//! Load outcomes are shared between every caller waiting on the same
//! deduplicated load, so these kinds are `Clone` and carry rendered
//! messages rather than the underlying error trees. The trees are logged
//! where the failure happens.

use derive_more::{Display, Error};
use std::path::PathBuf;
use wiki_content::ContentKind;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A content type could not be loaded. Invalidate it and initialize
    /// again to retry.
    #[display("failed to load {kind} content: {cause}")]
    ContentLoad { kind: ContentKind, cause: LoadCause },
}

/// Why a content load failed.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum LoadCause {
    /// The source does not exist in the backend.
    #[display("source not found: {}", _0.display())]
    NotFound(PathBuf),
    /// The backend failed to deliver the source.
    #[display("storage error: {_0}")]
    Storage(String),
    /// The source was delivered but is not a readable dataset.
    #[display("unreadable source: {_0}")]
    Document(String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::ContentLoad { cause, .. } => matches!(cause, LoadCause::Storage(_)),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ErrorKind::ContentLoad { kind, .. } => *kind,
        }
    }
}
