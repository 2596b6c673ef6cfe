//! Errors raised while locating or reading dataset sources.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A source read error, with the location it was raised at.
pub type Error = exn::Exn<ErrorKind>;
/// Result of a backend operation.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong, from the loader's point of view: whether the source is
/// missing, unreachable right now, or misconfigured.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No source at that path.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Filesystem permissions, or HTTP 401/403.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Connection failures and unexpected HTTP statuses.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The path escapes the data root or can't be represented.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// The base URL of a remote backend is unusable.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Whether reading the same source again later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Network(_) | Self::BackendError(_))
    }
}
