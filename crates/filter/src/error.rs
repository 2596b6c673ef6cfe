//! Filter Error Types
//!
//! Filtering itself never fails: malformed input degrades to defaults. These
//! cover resolving presets and checking a resolved configuration.

use derive_more::{Display, Error};

/// A filter error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No preset with that name.
    #[display("unknown filter preset: {_0}")]
    UnknownPreset(#[error(not(source))] String),
    /// A resolved configuration is inconsistent.
    #[display("invalid filter configuration: {_0}")]
    InvalidConfig(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
