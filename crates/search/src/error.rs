//! Search Error Types

use derive_more::{Display, Error};

/// A search error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The content the index is built from could not be loaded.
    #[display("cannot build search indexes: {_0}")]
    Content(#[error(not(source))] wiki_library::error::ErrorKind),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Content(cause) => cause.is_retryable(),
        }
    }
}
