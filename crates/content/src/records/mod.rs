//! Typed records, one module per content type.

mod accessory;
mod character;
mod episode;
mod event;
mod gacha;
mod guide;
mod item;
mod mission;
mod quiz;
mod swimsuit;
mod tool;

pub use self::accessory::Accessory;
pub use self::character::Character;
pub use self::episode::Episode;
pub use self::event::Event;
pub use self::gacha::Gacha;
pub use self::guide::Guide;
pub use self::item::Item;
pub use self::mission::Mission;
pub use self::quiz::Quiz;
pub use self::swimsuit::Swimsuit;
pub use self::tool::Tool;
