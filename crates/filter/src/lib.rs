//! Filter, sort and pagination for wiki listing pages.
//!
//! A [`UnifiedFilter`] narrows one content type's records through the
//! configuration of its [`Preset`] (optionally overridden), keeping its
//! [`FilterState`] round-trippable through the page's URL query string.

pub mod error;
mod config;
mod engine;
mod filterable;
mod preset;
mod query;
mod state;

pub use crate::config::{BooleanFilter, DEFAULT_PAGE_SIZE, FilterConfig, FilterOverrides, SortBy, SortOption, StatFilter};
pub use crate::engine::{Comparator, FilterOptions, SearchPredicate, UnifiedFilter};
pub use crate::filterable::{Filterable, common_date, common_text};
pub use crate::preset::Preset;
pub use crate::query::{deserialize_filter_state, serialize_filter_state};
pub use crate::state::{DateRange, FilterState, StatRange};
