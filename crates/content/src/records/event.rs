use time::Date;

use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{EventType, LocalizedString, RecordMeta, Status};
use crate::{Content, ContentKind, Record, Row};

/// An in-game event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub event_type: EventType,
    pub status: Status,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub description: Option<LocalizedString>,
    pub rewards: Vec<String>,
    pub tags: Vec<String>,
}

impl Content for Event {
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
        self.rewards.iter().map(String::as_str).collect()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Event {
    const KIND: ContentKind = ContentKind::Event;

    collection_conversions!(Event);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            event_type: row.required("type")?,
            status: row.required("event_status")?,
            start_date: row.date("start_date")?,
            end_date: row.date("end_date")?,
            description: row.localized("description")?,
            rewards: row.list("rewards")?,
            tags: row.list("tags")?,
        })
    }
}
