mod lang;
mod meta;
mod rarity;
mod variants;

pub use self::lang::{Language, LocalizedString, get_localized_value};
pub use self::meta::{RecordMeta, is_valid_unique_key};
pub use self::rarity::Rarity;
pub use self::variants::{
    Attribute, Difficulty, EpisodeType, EventType, GachaType, ItemCategory, MissionType, Slot, Status,
};

pub(crate) fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('/', "").replace('-', "").replace('_', "").replace(' ', "")
}
