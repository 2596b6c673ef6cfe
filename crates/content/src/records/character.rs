use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{LocalizedString, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

/// A playable character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    /// Free-form, e.g. "June 6".
    pub birthday: Option<String>,
    pub age: Option<u32>,
    /// Centimetres.
    pub height: Option<u32>,
    pub blood_type: Option<String>,
    pub job: Option<LocalizedString>,
    pub hobby: Option<LocalizedString>,
    pub tags: Vec<String>,
}

impl Content for Character {
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
        self.job.iter().chain(self.hobby.iter()).collect()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Character {
    const KIND: ContentKind = ContentKind::Character;

    collection_conversions!(Character);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            birthday: row.text("birthday")?,
            age: row.number("age")?,
            height: row.number("height")?,
            blood_type: row.text("blood_type")?,
            job: row.localized("job")?,
            hobby: row.localized("hobby")?,
            tags: row.list("tags")?,
        })
    }
}
