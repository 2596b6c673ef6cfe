use time::Date;

use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{GachaType, LocalizedString, RecordMeta, Status};
use crate::{Content, ContentKind, Record, Row};

/// A gacha banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gacha {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub status: Status,
    pub gacha_type: Option<GachaType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    /// Featured swimsuits or characters, by unique key or name.
    pub featured: Vec<String>,
    pub cost: Option<u32>,
    pub tags: Vec<String>,
}

impl Content for Gacha {
    fn kind(&self) -> ContentKind {
        Self::KIND
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn title(&self) -> &LocalizedString {
        &self.name
    }

    fn keywords(&self) -> Vec<&str> {
        self.featured.iter().map(String::as_str).collect()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Gacha {
    const KIND: ContentKind = ContentKind::Gacha;

    collection_conversions!(Gacha);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            status: row.required("gacha_status")?,
            gacha_type: row.parse("type")?,
            start_date: row.date("start_date")?,
            end_date: row.date("end_date")?,
            featured: row.list("featured")?,
            cost: row.number("cost")?,
            tags: row.list("tags")?,
        })
    }
}
