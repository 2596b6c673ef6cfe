//! Free-text search over wiki content.
//!
//! [`SearchIndexService`] builds one inverted index per content type and
//! language from a [`ContentLoader`](wiki_library::ContentLoader), then
//! answers ranked queries and per-type counts from memory.

pub mod error;
mod index;
mod service;
mod tokenizer;

pub use crate::index::{Document, MatchKind};
pub use crate::service::{SearchIndexService, SearchOptions, SearchResponse, SearchResult, SearchSettings};
pub use crate::tokenizer::{normalize, tokenize};
