use time::Date;

use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{Attribute, LocalizedString, Rarity, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

/// A swimsuit card worn by a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swimsuit {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    /// Unique key (or display name) of the wearing character.
    pub character: String,
    pub rarity: Rarity,
    pub attribute: Option<Attribute>,
    pub pow: Option<u32>,
    pub tec: Option<u32>,
    pub stm: Option<u32>,
    pub apl: Option<u32>,
    pub release_date: Option<Date>,
    pub is_limited: bool,
    pub has_malfunction: bool,
    pub tags: Vec<String>,
}
impl Swimsuit {
    /// Sum of the four stats, or `None` when no stat is known.
    pub fn total_stats(&self) -> Option<u32> {
        let stats = [self.pow, self.tec, self.stm, self.apl];
        stats.iter().any(Option::is_some).then(|| stats.iter().flatten().sum())
    }
}

impl Content for Swimsuit {
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
        vec![self.character.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Swimsuit {
    const KIND: ContentKind = ContentKind::Swimsuit;

    collection_conversions!(Swimsuit);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            character: row.required_text("character")?,
            rarity: row.required("rarity")?,
            attribute: row.parse("type")?,
            pow: row.number("pow")?,
            tec: row.number("tec")?,
            stm: row.number("stm")?,
            apl: row.number("apl")?,
            release_date: row.date("release_date")?,
            is_limited: row.flag("is_limited")?,
            has_malfunction: row.flag("has_malfunction")?,
            tags: row.list("tags")?,
        })
    }
}
