//! Content loading for the wiki core.
//!
//! [`ContentLoader`] fetches every content type's source through a storage
//! backend, parses it into typed records and publishes the result into a
//! shared [`Cache`](wiki_cache::Cache). Concurrent loads of the same type
//! coalesce into one fetch.

pub mod error;
mod loader;
mod report;
mod sources;

pub use crate::loader::{ContentCache, ContentLoader, INITIALIZE_KEY};
pub use crate::report::LoadReport;
pub use crate::sources::Sources;
