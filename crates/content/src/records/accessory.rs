use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{LocalizedString, Rarity, RecordMeta, Slot};
use crate::{Content, ContentKind, Record, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessory {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub rarity: Rarity,
    pub slot: Slot,
    pub pow: Option<u32>,
    pub tec: Option<u32>,
    pub stm: Option<u32>,
    pub tags: Vec<String>,
}

impl Content for Accessory {
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
        vec![self.slot.into()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Accessory {
    const KIND: ContentKind = ContentKind::Accessory;

    collection_conversions!(Accessory);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            rarity: row.required("rarity")?,
            slot: row.required("slot")?,
            pow: row.number("pow")?,
            tec: row.number("tec")?,
            stm: row.number("stm")?,
            tags: row.list("tags")?,
        })
    }
}
