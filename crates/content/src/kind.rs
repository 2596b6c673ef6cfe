//! The eleven content types and their type-erased collection.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};
use crate::models::sanitize;
use crate::records::{Accessory, Character, Episode, Event, Gacha, Guide, Item, Mission, Quiz, Swimsuit, Tool};
use crate::{Content, Record};

/// A content type.
///
/// Declaration order is the canonical order used everywhere a stable order
/// between types is needed (loading, result ties, counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "&'static str"))]
pub enum ContentKind {
    Character,
    Event,
    Swimsuit,
    Item,
    Guide,
    Gacha,
    Episode,
    Tool,
    Accessory,
    Mission,
    Quiz,
}
impl ContentKind {
    pub const ALL: [ContentKind; 11] = [
        Self::Character,
        Self::Event,
        Self::Swimsuit,
        Self::Item,
        Self::Guide,
        Self::Gacha,
        Self::Episode,
        Self::Tool,
        Self::Accessory,
        Self::Mission,
        Self::Quiz,
    ];

    /// Singular lowercase name, as used in URLs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Character => "character",
            ContentKind::Event => "event",
            ContentKind::Swimsuit => "swimsuit",
            ContentKind::Item => "item",
            ContentKind::Guide => "guide",
            ContentKind::Gacha => "gacha",
            ContentKind::Episode => "episode",
            ContentKind::Tool => "tool",
            ContentKind::Accessory => "accessory",
            ContentKind::Mission => "mission",
            ContentKind::Quiz => "quiz",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ContentKind::Character => "characters",
            ContentKind::Event => "events",
            ContentKind::Swimsuit => "swimsuits",
            ContentKind::Item => "items",
            ContentKind::Guide => "guides",
            ContentKind::Gacha => "gachas",
            ContentKind::Episode => "episodes",
            ContentKind::Tool => "tools",
            ContentKind::Accessory => "accessories",
            ContentKind::Mission => "missions",
            ContentKind::Quiz => "quizzes",
        }
    }

    /// Source path used when configuration does not name one.
    pub fn default_source(&self) -> &'static str {
        match self {
            ContentKind::Character => "characters.csv",
            ContentKind::Event => "events.json",
            ContentKind::Swimsuit => "swimsuits.csv",
            ContentKind::Item => "items.csv",
            ContentKind::Guide => "guides.json",
            ContentKind::Gacha => "gachas.json",
            ContentKind::Episode => "episodes.csv",
            ContentKind::Tool => "tools.json",
            ContentKind::Accessory => "accessories.csv",
            ContentKind::Mission => "missions.csv",
            ContentKind::Quiz => "quizzes.json",
        }
    }

    /// Key of this type's collection in the content cache, which doubles as
    /// the dedup key of its load.
    ///
    /// ```
    /// use wiki_content::ContentKind;
    /// assert_eq!(ContentKind::Quiz.cache_key(), "content:quizzes");
    /// ```
    pub fn cache_key(&self) -> String {
        format!("content:{}", self.plural())
    }
}
impl TryFrom<String> for ContentKind {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl From<ContentKind> for &'static str {
    fn from(value: ContentKind) -> Self {
        value.as_str()
    }
}
impl FromStr for ContentKind {
    type Err = Error;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        match ContentKind::ALL.into_iter().find(|kind| sanitized == kind.as_str() || sanitized == kind.plural()) {
            Some(kind) => Ok(kind),
            None => exn::bail!(ErrorKind::ParseError {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}
impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A loaded collection of any content type.
///
/// The variants hold reference-counted slices, so cloning a collection (out
/// of the cache, for instance) never copies records.
#[derive(Debug, Clone)]
pub enum Collection {
    Character(Arc<[Character]>),
    Event(Arc<[Event]>),
    Swimsuit(Arc<[Swimsuit]>),
    Item(Arc<[Item]>),
    Guide(Arc<[Guide]>),
    Gacha(Arc<[Gacha]>),
    Episode(Arc<[Episode]>),
    Tool(Arc<[Tool]>),
    Accessory(Arc<[Accessory]>),
    Mission(Arc<[Mission]>),
    Quiz(Arc<[Quiz]>),
}
impl Collection {
    /// Wraps typed records.
    pub fn new<T: Record>(records: impl Into<Arc<[T]>>) -> Self {
        T::into_collection(records.into())
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Collection::Character(_) => ContentKind::Character,
            Collection::Event(_) => ContentKind::Event,
            Collection::Swimsuit(_) => ContentKind::Swimsuit,
            Collection::Item(_) => ContentKind::Item,
            Collection::Guide(_) => ContentKind::Guide,
            Collection::Gacha(_) => ContentKind::Gacha,
            Collection::Episode(_) => ContentKind::Episode,
            Collection::Tool(_) => ContentKind::Tool,
            Collection::Accessory(_) => ContentKind::Accessory,
            Collection::Mission(_) => ContentKind::Mission,
            Collection::Quiz(_) => ContentKind::Quiz,
        }
    }

    /// The typed records, if this collection holds `T`.
    pub fn downcast<T: Record>(&self) -> Option<Arc<[T]>> {
        T::from_collection(self)
    }

    /// Every record, in source order, through the type-erased view.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &dyn Content> + '_> {
        fn erase<T: Content>(records: &[T]) -> Box<dyn Iterator<Item = &dyn Content> + '_> {
            Box::new(records.iter().map(|record| record as &dyn Content))
        }
        match self {
            Collection::Character(records) => erase(records),
            Collection::Event(records) => erase(records),
            Collection::Swimsuit(records) => erase(records),
            Collection::Item(records) => erase(records),
            Collection::Guide(records) => erase(records),
            Collection::Gacha(records) => erase(records),
            Collection::Episode(records) => erase(records),
            Collection::Tool(records) => erase(records),
            Collection::Accessory(records) => erase(records),
            Collection::Mission(records) => erase(records),
            Collection::Quiz(records) => erase(records),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Character(records) => records.len(),
            Collection::Event(records) => records.len(),
            Collection::Swimsuit(records) => records.len(),
            Collection::Item(records) => records.len(),
            Collection::Guide(records) => records.len(),
            Collection::Gacha(records) => records.len(),
            Collection::Episode(records) => records.len(),
            Collection::Tool(records) => records.len(),
            Collection::Accessory(records) => records.len(),
            Collection::Mission(records) => records.len(),
            Collection::Quiz(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Implements the [`Record`] collection conversions for one variant.
macro_rules! collection_conversions {
    ($variant:ident) => {
        fn into_collection(records: std::sync::Arc<[Self]>) -> $crate::Collection {
            $crate::Collection::$variant(records)
        }

        fn from_collection(collection: &$crate::Collection) -> Option<std::sync::Arc<[Self]>> {
            match collection {
                $crate::Collection::$variant(records) => Some(std::sync::Arc::clone(records)),
                _ => None,
            }
        }
    };
}
pub(crate) use collection_conversions;
