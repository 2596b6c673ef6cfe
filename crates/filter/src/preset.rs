use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use wiki_content::ContentKind;
use wiki_content::models::Rarity;

use crate::config::{BooleanFilter, FilterConfig, SortBy, SortOption, StatFilter};
use crate::error::{Error, ErrorKind};

/// The built-in filter setup of one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preset {
    Characters,
    Events,
    Swimsuits,
    Items,
    Guides,
    Gachas,
    Episodes,
    Tools,
    Accessories,
    Missions,
    Quizzes,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn alphabetical() -> Vec<SortOption> {
    vec![
        SortOption::new("a-z", "A-Z", SortBy::Alphabetical),
        SortOption::new("z-a", "Z-A", SortBy::ReverseAlphabetical),
    ]
}

fn by_date(field: &str) -> Vec<SortOption> {
    vec![
        SortOption::new("newest", "Newest", SortBy::Newest(field.to_string())),
        SortOption::new("oldest", "Oldest", SortBy::Oldest(field.to_string())),
    ]
}

fn by_rarity() -> Vec<SortOption> {
    vec![
        SortOption::new("rarity-desc", "Rarity (high to low)", SortBy::RarityDesc),
        SortOption::new("rarity-asc", "Rarity (low to high)", SortBy::RarityAsc),
    ]
}

fn by_stat(key: &str, label: &str) -> SortOption {
    SortOption::new(format!("{key}-desc"), label, SortBy::StatDesc(key.to_string()))
}

impl Preset {
    pub const ALL: [Preset; 11] = [
        Self::Characters,
        Self::Events,
        Self::Swimsuits,
        Self::Items,
        Self::Guides,
        Self::Gachas,
        Self::Episodes,
        Self::Tools,
        Self::Accessories,
        Self::Missions,
        Self::Quizzes,
    ];

    pub fn kind(&self) -> ContentKind {
        match self {
            Preset::Characters => ContentKind::Character,
            Preset::Events => ContentKind::Event,
            Preset::Swimsuits => ContentKind::Swimsuit,
            Preset::Items => ContentKind::Item,
            Preset::Guides => ContentKind::Guide,
            Preset::Gachas => ContentKind::Gacha,
            Preset::Episodes => ContentKind::Episode,
            Preset::Tools => ContentKind::Tool,
            Preset::Accessories => ContentKind::Accessory,
            Preset::Missions => ContentKind::Mission,
            Preset::Quizzes => ContentKind::Quiz,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().plural()
    }

    /// The preset's configuration, on top of [`FilterConfig::default()`].
    pub fn defaults(&self) -> FilterConfig {
        let base = FilterConfig::default();
        match self {
            Preset::Characters => FilterConfig {
                search_fields: strings(&["name", "job", "hobby", "tags"]),
                sort_options: [alphabetical(), vec![by_stat("age", "Age"), by_stat("height", "Height")]].concat(),
                stat_filters: vec![
                    StatFilter::new("age", "Age", 0.0, 100.0),
                    StatFilter::new("height", "Height", 100.0, 200.0),
                ],
                ..base
            },
            Preset::Events => FilterConfig {
                search_fields: strings(&["name", "description", "rewards", "tags"]),
                sort_options: [by_date("start_date"), alphabetical()].concat(),
                default_sort: "newest".to_string(),
                status_options: strings(&["Active", "Upcoming", "Ended"]),
                type_options: strings(&["Main", "Daily", "Event"]),
                date_field: "start_date".to_string(),
                ..base
            },
            Preset::Swimsuits => FilterConfig {
                search_fields: strings(&["name", "character", "tags"]),
                sort_options: [
                    by_rarity(),
                    by_date("release_date"),
                    alphabetical(),
                    vec![
                        by_stat("pow", "POW"),
                        by_stat("tec", "TEC"),
                        by_stat("stm", "STM"),
                        by_stat("apl", "APL"),
                        by_stat("total", "Total stats"),
                    ],
                ]
                .concat(),
                default_sort: "rarity-desc".to_string(),
                rarity_options: Rarity::ALL.to_vec(),
                type_options: strings(&["POW", "TEC", "STM"]),
                stat_filters: vec![
                    StatFilter::new("pow", "POW", 0.0, 5000.0),
                    StatFilter::new("tec", "TEC", 0.0, 5000.0),
                    StatFilter::new("stm", "STM", 0.0, 5000.0),
                    StatFilter::new("apl", "APL", 0.0, 5000.0),
                ],
                boolean_filters: vec![
                    BooleanFilter::new("is_limited", "Limited"),
                    BooleanFilter::new("has_malfunction", "Malfunction"),
                ],
                date_field: "release_date".to_string(),
                ..base
            },
            Preset::Items => FilterConfig {
                search_fields: strings(&["name", "description", "sources", "tags"]),
                sort_options: [by_rarity(), alphabetical()].concat(),
                default_sort: "rarity-desc".to_string(),
                rarity_options: Rarity::ALL.to_vec(),
                category_options: strings(&["Currency", "Upgrade", "Consumable", "Gift", "Material", "Special"]),
                ..base
            },
            Preset::Guides => FilterConfig {
                search_fields: strings(&["title", "summary", "category", "tags"]),
                sort_options: [alphabetical(), by_date("updated_at")].concat(),
                type_options: strings(&["Easy", "Medium", "Hard"]),
                stat_filters: vec![StatFilter::new("read_time", "Reading time", 0.0, 60.0)],
                ..base
            },
            Preset::Gachas => FilterConfig {
                search_fields: strings(&["name", "featured", "tags"]),
                sort_options: [by_date("start_date"), alphabetical(), vec![by_stat("cost", "Cost")]].concat(),
                default_sort: "newest".to_string(),
                status_options: strings(&["Active", "Upcoming", "Ended"]),
                type_options: strings(&["Premium", "Standard", "Event", "StepUp"]),
                stat_filters: vec![StatFilter::new("cost", "Cost", 0.0, 3000.0)],
                date_field: "start_date".to_string(),
                ..base
            },
            Preset::Episodes => FilterConfig {
                search_fields: strings(&["title", "summary", "character", "tags"]),
                sort_options: [by_date("release_date"), alphabetical()].concat(),
                default_sort: "newest".to_string(),
                type_options: strings(&["Main", "Character", "Event", "Extra"]),
                date_field: "release_date".to_string(),
                ..base
            },
            Preset::Tools => FilterConfig {
                search_fields: strings(&["name", "description", "category", "tags"]),
                ..base
            },
            Preset::Accessories => FilterConfig {
                sort_options: [
                    by_rarity(),
                    alphabetical(),
                    vec![by_stat("pow", "POW"), by_stat("tec", "TEC"), by_stat("stm", "STM")],
                ]
                .concat(),
                default_sort: "rarity-desc".to_string(),
                rarity_options: Rarity::ALL.to_vec(),
                type_options: strings(&["Head", "Face", "Arm"]),
                stat_filters: vec![
                    StatFilter::new("pow", "POW", 0.0, 1000.0),
                    StatFilter::new("tec", "TEC", 0.0, 1000.0),
                    StatFilter::new("stm", "STM", 0.0, 1000.0),
                ],
                ..base
            },
            Preset::Missions => FilterConfig {
                search_fields: strings(&["name", "objective", "reward", "tags"]),
                type_options: strings(&["Daily", "Weekly", "Event", "Achievement"]),
                boolean_filters: vec![BooleanFilter::new("is_repeatable", "Repeatable")],
                ..base
            },
            Preset::Quizzes => FilterConfig {
                search_fields: strings(&["title", "category", "tags"]),
                sort_options: [alphabetical(), by_date("updated_at")].concat(),
                type_options: strings(&["Easy", "Medium", "Hard"]),
                stat_filters: vec![
                    StatFilter::new("question_count", "Questions", 0.0, 100.0),
                    StatFilter::new("time_limit", "Time limit", 0.0, 3600.0),
                ],
                ..base
            },
        }
    }
}
impl From<ContentKind> for Preset {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Character => Preset::Characters,
            ContentKind::Event => Preset::Events,
            ContentKind::Swimsuit => Preset::Swimsuits,
            ContentKind::Item => Preset::Items,
            ContentKind::Guide => Preset::Guides,
            ContentKind::Gacha => Preset::Gachas,
            ContentKind::Episode => Preset::Episodes,
            ContentKind::Tool => Preset::Tools,
            ContentKind::Accessory => Preset::Accessories,
            ContentKind::Mission => Preset::Missions,
            ContentKind::Quiz => Preset::Quizzes,
        }
    }
}
impl FromStr for Preset {
    type Err = Error;
    /// Accepts the content type name, singular or plural.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ContentKind>() {
            Ok(kind) => Ok(kind.into()),
            Err(_) => exn::bail!(ErrorKind::UnknownPreset(s.to_string())),
        }
    }
}
impl Display for Preset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
