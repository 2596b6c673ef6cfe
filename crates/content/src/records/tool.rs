use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{LocalizedString, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

/// A community tool or calculator linked from the wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub category: String,
    pub description: Option<LocalizedString>,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl Content for Tool {
    fn kind(&self) -> ContentKind {
        Self::KIND
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn title(&self) -> &LocalizedString {
        &self.name
    }

    fn summaries(&self) -> Vec<&LocalizedString> {
        self.description.iter().collect()
    }

    fn keywords(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Tool {
    const KIND: ContentKind = ContentKind::Tool;

    collection_conversions!(Tool);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            category: row.required_text("category")?,
            description: row.localized("description")?,
            url: row.text("url")?,
            tags: row.list("tags")?,
        })
    }
}
