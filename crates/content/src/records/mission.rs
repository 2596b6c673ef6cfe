use crate::error::Result;
use crate::kind::collection_conversions;
use crate::models::{LocalizedString, MissionType, RecordMeta};
use crate::{Content, ContentKind, Record, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub meta: RecordMeta,
    pub name: LocalizedString,
    pub mission_type: MissionType,
    pub objective: Option<LocalizedString>,
    pub reward: Option<String>,
    pub is_repeatable: bool,
    pub tags: Vec<String>,
}

impl Content for Mission {
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
        self.objective.iter().collect()
    }

    fn keywords(&self) -> Vec<&str> {
        self.reward.iter().map(String::as_str).collect()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Record for Mission {
    const KIND: ContentKind = ContentKind::Mission;

    collection_conversions!(Mission);

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            meta: row.meta()?,
            name: row.required_localized("name")?,
            mission_type: row.required("type")?,
            objective: row.localized("objective")?,
            reward: row.text("reward")?,
            is_repeatable: row.flag("is_repeatable")?,
            tags: row.list("tags")?,
        })
    }
}
