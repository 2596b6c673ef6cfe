use std::sync::Arc;

use crate::error::Result;
use crate::models::{LocalizedString, RecordMeta};
use crate::{Collection, ContentKind, Row};

/// Read-only view shared by every content record.
///
/// Object safe, so collections of different types can be walked through
/// `&dyn Content` (see [`Collection::iter()`]).
pub trait Content: Send + Sync {
    fn kind(&self) -> ContentKind;

    fn meta(&self) -> &RecordMeta;

    /// The record's display name or title.
    fn title(&self) -> &LocalizedString;

    /// Secondary localized text worth searching (descriptions, summaries).
    fn summaries(&self) -> Vec<&LocalizedString> {
        Vec::new()
    }

    /// Secondary plain-text values worth searching (categories, references
    /// to other records).
    fn keywords(&self) -> Vec<&str> {
        Vec::new()
    }

    fn tags(&self) -> &[String];

    fn unique_key(&self) -> &str {
        &self.meta().unique_key
    }
}

/// A typed content record that can be parsed from a source row.
pub trait Record: Content + Clone + Sized + 'static {
    const KIND: ContentKind;

    /// Builds the record from one source row, validating required fields and
    /// value domains.
    fn from_row(row: &Row) -> Result<Self>;

    fn into_collection(records: Arc<[Self]>) -> Collection;

    fn from_collection(collection: &Collection) -> Option<Arc<[Self]>>;
}
