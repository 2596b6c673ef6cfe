//! Closed value domains of enumerated record fields.
//!
//! All of these parse case-insensitively from their display names.

use strum::{Display, EnumString, IntoStaticStr};

/// Kind of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum EventType {
    Main,
    Daily,
    Event,
}

/// Availability window of an event or gacha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Status {
    Active,
    Upcoming,
    Ended,
}

/// Primary stat of a swimsuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Attribute {
    #[strum(serialize = "POW")]
    Pow,
    #[strum(serialize = "TEC")]
    Tec,
    #[strum(serialize = "STM")]
    Stm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ItemCategory {
    Currency,
    Upgrade,
    Consumable,
    Gift,
    Material,
    Special,
}

/// Difficulty of a guide or quiz. The guide datasets use the skill-level
/// names, which are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    #[strum(to_string = "Easy", serialize = "Beginner")]
    Easy,
    #[strum(to_string = "Medium", serialize = "Intermediate")]
    Medium,
    #[strum(to_string = "Hard", serialize = "Advanced")]
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum GachaType {
    Premium,
    Standard,
    Event,
    #[strum(to_string = "StepUp", serialize = "Step-Up", serialize = "Step Up", serialize = "step_up")]
    StepUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum EpisodeType {
    Main,
    Character,
    Event,
    Extra,
}

/// Equipment slot of an accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Slot {
    Head,
    Face,
    Arm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum MissionType {
    Daily,
    Weekly,
    Event,
    Achievement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Beginner", Difficulty::Easy)]
    #[case("easy", Difficulty::Easy)]
    #[case("INTERMEDIATE", Difficulty::Medium)]
    #[case("advanced", Difficulty::Hard)]
    fn test_difficulty_aliases(#[case] input: &str, #[case] expected: Difficulty) {
        assert_eq!(input.parse::<Difficulty>().unwrap(), expected);
    }

    #[test]
    fn test_display_uses_canonical_names() {
        assert_eq!(Difficulty::Easy.to_string(), "Easy");
        assert_eq!(GachaType::StepUp.to_string(), "StepUp");
        assert_eq!(Attribute::Pow.to_string(), "POW");
        let name: &'static str = Status::Upcoming.into();
        assert_eq!(name, "Upcoming");
    }

    #[rstest]
    #[case("step-up")]
    #[case("Step Up")]
    #[case("stepup")]
    fn test_gacha_type_spellings(#[case] input: &str) {
        assert_eq!(input.parse::<GachaType>().unwrap(), GachaType::StepUp);
    }

    #[rstest]
    #[case("pow", Attribute::Pow)]
    #[case("Tec", Attribute::Tec)]
    fn test_attribute_case_insensitive(#[case] input: &str, #[case] expected: Attribute) {
        assert_eq!(input.parse::<Attribute>().unwrap(), expected);
    }

    #[test]
    fn test_outside_domain() {
        assert!("Weekly".parse::<EventType>().is_err());
        assert!("Paused".parse::<Status>().is_err());
        assert!("Leg".parse::<Slot>().is_err());
    }
}
