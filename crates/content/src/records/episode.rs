use time::Date;

use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{EpisodeType, LocalizedString, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

/// A story episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub meta: RecordMeta,
    pub title: LocalizedString,
    pub episode_type: EpisodeType,
    pub character: Option<String>,
    pub release_date: Option<Date>,
    pub summary: Option<LocalizedString>,
    pub tags: Vec<String>,
}

impl Content for Episode {
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
        self.character.iter().map(String::as_str).collect()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Episode {
    const KIND: ContentKind = ContentKind::Episode;

    collection_conversions!(Episode);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            title: row.required_localized("title")?,
            episode_type: row.required("type")?,
            character: row.text("character")?,
            release_date: row.date("release_date")?,
            summary: row.localized("summary")?,
            tags: row.list("tags")?,
        })
    }
}
