use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{ItemCategory, LocalizedString, Rarity, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub category: ItemCategory,
    pub rarity: Rarity,
    pub description: Option<LocalizedString>,
    /// Where the item can be obtained.
    pub sources: Vec<String>,
    pub tags: Vec<String>,
}

impl Content for Item {
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
        let mut keywords: Vec<&str> = vec![self.category.into()];
        keywords.extend(self.sources.iter().map(String::as_str));
        keywords
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Item {
    const KIND: ContentKind = ContentKind::Item;

    collection_conversions!(Item);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            category: row.required("category")?,
            rarity: row.required("rarity")?,
            description: row.localized("description")?,
            sources: row.list("sources")?,
            tags: row.list("tags")?,
        })
    }
}
