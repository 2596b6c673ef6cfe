//! Content Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Row-level kinds also travel inside
//! [`Rejected`](crate::Rejected) entries, which is why they are `Clone`.

use derive_more::{Display, Error};

/// A content error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source as a whole cannot be read as a dataset.
    #[display("invalid document: {_0}")]
    InvalidDocument(#[error(not(source))] String),
    /// A required field is absent or blank.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value, as found.
        value: String,
    },
    /// Another record of the same type already uses this unique key.
    #[display("duplicate unique key: {_0}")]
    DuplicateKey(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Parsing is deterministic: the same bytes fail the same way.
        false
    }
}
