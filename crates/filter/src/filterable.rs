//! Field access used by the filter engine.
//!
//! Field and stat names are the source column names, so a configuration
//! can refer to `"pow"` or `"release_date"` the same way the datasets do.

use time::Date;
use wiki_content::Record;
use wiki_content::models::{Language, LocalizedString, Rarity};
use wiki_content::records::{Accessory, Character, Episode, Event, Gacha, Guide, Item, Mission, Quiz, Swimsuit, Tool};

/// A record the filter engine can narrow and sort.
///
/// Every accessor returns `None` (or nothing) for fields the type doesn't
/// have. A record without a value for an active filter never matches it.
pub trait Filterable: Record {
    /// Searchable text of `field` in `language`. List fields yield one
    /// entry per element.
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        common_text(self, field, language)
    }

    fn category(&self) -> Option<&str> {
        None
    }

    fn rarity(&self) -> Option<Rarity> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    /// The "type" facet.
    fn variant(&self) -> Option<&str> {
        None
    }

    fn stat(&self, _key: &str) -> Option<f64> {
        None
    }

    fn date(&self, field: &str) -> Option<Date> {
        common_date(self, field)
    }

    fn flag(&self, _key: &str) -> Option<bool> {
        None
    }
}

/// Fields every record has: its title (as `name` or `title`), tags and
/// unique key.
pub fn common_text<'a, T: Record>(record: &'a T, field: &str, language: Language) -> Vec<&'a str> {
    match field {
        "name" | "title" => vec![record.title().get(language)],
        "tags" => record.tags().iter().map(String::as_str).collect(),
        "unique_key" => vec![record.unique_key()],
        _ => Vec::new(),
    }
}

pub fn common_date<T: Record>(record: &T, field: &str) -> Option<Date> {
    (field == "updated_at").then(|| record.meta().updated_at)
}

fn localized(value: Option<&LocalizedString>, language: Language) -> Vec<&str> {
    value.map(|text| text.get(language)).into_iter().collect()
}

fn list(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn number(value: Option<u32>) -> Option<f64> {
    value.map(f64::from)
}

impl Filterable for Character {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "job" => localized(self.job.as_ref(), language),
            "hobby" => localized(self.hobby.as_ref(), language),
            "blood_type" => self.blood_type.as_deref().into_iter().collect(),
            _ => common_text(self, field, language),
        }
    }

    fn stat(&self, key: &str) -> Option<f64> {
        match key {
            "age" => number(self.age),
            "height" => number(self.height),
            _ => None,
        }
    }
}

impl Filterable for Event {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "description" => localized(self.description.as_ref(), language),
            "rewards" => list(&self.rewards),
            _ => common_text(self, field, language),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.into())
    }

    fn variant(&self) -> Option<&str> {
        Some(self.event_type.into())
    }

    fn date(&self, field: &str) -> Option<Date> {
        match field {
            "start_date" => self.start_date,
            "end_date" => self.end_date,
            _ => common_date(self, field),
        }
    }
}

impl Filterable for Swimsuit {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "character" => vec![self.character.as_str()],
            _ => common_text(self, field, language),
        }
    }

    fn rarity(&self) -> Option<Rarity> {
        Some(self.rarity)
    }

    fn variant(&self) -> Option<&str> {
        self.attribute.map(Into::into)
    }

    fn stat(&self, key: &str) -> Option<f64> {
        match key {
            "pow" => number(self.pow),
            "tec" => number(self.tec),
            "stm" => number(self.stm),
            "apl" => number(self.apl),
            "total" => number(self.total_stats()),
            _ => None,
        }
    }

    fn date(&self, field: &str) -> Option<Date> {
        match field {
            "release_date" => self.release_date,
            _ => common_date(self, field),
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "is_limited" => Some(self.is_limited),
            "has_malfunction" => Some(self.has_malfunction),
            _ => None,
        }
    }
}

impl Filterable for Item {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "description" => localized(self.description.as_ref(), language),
            "sources" => list(&self.sources),
            "category" => vec![self.category.into()],
            _ => common_text(self, field, language),
        }
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.into())
    }

    fn rarity(&self) -> Option<Rarity> {
        Some(self.rarity)
    }
}

impl Filterable for Guide {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "summary" => localized(self.summary.as_ref(), language),
            "category" => vec![self.category.as_str()],
            _ => common_text(self, field, language),
        }
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn variant(&self) -> Option<&str> {
        self.difficulty.map(Into::into)
    }

    fn stat(&self, key: &str) -> Option<f64> {
        (key == "read_time").then_some(number(self.read_time)).flatten()
    }
}

impl Filterable for Gacha {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "featured" => list(&self.featured),
            _ => common_text(self, field, language),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.into())
    }

    fn variant(&self) -> Option<&str> {
        self.gacha_type.map(Into::into)
    }

    fn stat(&self, key: &str) -> Option<f64> {
        (key == "cost").then_some(number(self.cost)).flatten()
    }

    fn date(&self, field: &str) -> Option<Date> {
        match field {
            "start_date" => self.start_date,
            "end_date" => self.end_date,
            _ => common_date(self, field),
        }
    }
}

impl Filterable for Episode {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "summary" => localized(self.summary.as_ref(), language),
            "character" => self.character.as_deref().into_iter().collect(),
            _ => common_text(self, field, language),
        }
    }

    fn variant(&self) -> Option<&str> {
        Some(self.episode_type.into())
    }

    fn date(&self, field: &str) -> Option<Date> {
        match field {
            "release_date" => self.release_date,
            _ => common_date(self, field),
        }
    }
}

impl Filterable for Tool {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "description" => localized(self.description.as_ref(), language),
            "category" => vec![self.category.as_str()],
            "url" => self.url.as_deref().into_iter().collect(),
            _ => common_text(self, field, language),
        }
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

impl Filterable for Accessory {
    fn rarity(&self) -> Option<Rarity> {
        Some(self.rarity)
    }

    fn variant(&self) -> Option<&str> {
        Some(self.slot.into())
    }

    fn stat(&self, key: &str) -> Option<f64> {
        match key {
            "pow" => number(self.pow),
            "tec" => number(self.tec),
            "stm" => number(self.stm),
            _ => None,
        }
    }
}

impl Filterable for Mission {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "objective" => localized(self.objective.as_ref(), language),
            "reward" => self.reward.as_deref().into_iter().collect(),
            _ => common_text(self, field, language),
        }
    }

    fn variant(&self) -> Option<&str> {
        Some(self.mission_type.into())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        (key == "is_repeatable").then_some(self.is_repeatable)
    }
}

impl Filterable for Quiz {
    fn text(&self, field: &str, language: Language) -> Vec<&str> {
        match field {
            "category" => vec![self.category.as_str()],
            _ => common_text(self, field, language),
        }
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn variant(&self) -> Option<&str> {
        Some(self.difficulty.into())
    }

    fn stat(&self, key: &str) -> Option<f64> {
        match key {
            "question_count" => number(self.question_count),
            "time_limit" => number(self.time_limit),
            _ => None,
        }
    }
}
