use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{Difficulty, LocalizedString, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

/// A written guide. The body lives in a separate markdown document that
/// this core never opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    pub meta: RecordMeta,
    pub title: LocalizedString,
    pub summary: Option<LocalizedString>,
    pub category: String,
    pub difficulty: Option<Difficulty>,
    /// Minutes.
    pub read_time: Option<u32>,
    /// Opaque reference to the guide body, resolved by the renderer.
    pub content_path: Option<String>,
    pub tags: Vec<String>,
}

impl Content for Guide {
    fn kind(&self) -> ContentKind {
        Self::KIND
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn title(&self) -> &LocalizedString {
        &self.title
    }

    fn summaries(&self) -> Vec<&LocalizedString> {
        self.summary.iter().collect()
    }

    fn keywords(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Guide {
    const KIND: ContentKind = ContentKind::Guide;

    collection_conversions!(Guide);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            title: row.required_localized("title")?,
            summary: row.localized("summary")?,
            category: row.required_text("category")?,
            difficulty: row.parse("difficulty")?,
            read_time: row.number("read_time")?,
            content_path: row.text("content_path")?,
            tags: row.list("tags")?,
        })
    }
}
