use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{Difficulty, LocalizedString, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub meta: RecordMeta,
    pub title: LocalizedString,
    pub category: String,
    pub difficulty: Difficulty,
    pub question_count: Option<u32>,
    /// Seconds.
    pub time_limit: Option<u32>,
    pub tags: Vec<String>,
}

impl Content for Quiz {
    fn kind(&self) -> ContentKind {
        Self::KIND
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn title(&self) -> &LocalizedString {
        &self.title
    }

    fn keywords(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Quiz {
    const KIND: ContentKind = ContentKind::Quiz;

    collection_conversions!(Quiz);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            title: row.required_localized("title")?,
            category: row.required_text("category")?,
            difficulty: row.required("difficulty")?,
            question_count: row.number("question_count")?,
            time_limit: row.number("time_limit")?,
            tags: row.list("tags")?,
        })
    }
}
