use wiki_content::models::Rarity;

use crate::error::{ErrorKind, Result};
use crate::preset::Preset;

/// Page size used when neither a preset nor the caller sets one.
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// A built-in ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortBy {
    /// By title in the active language, case-insensitive.
    Alphabetical,
    ReverseAlphabetical,
    /// Latest date first, by the named date field.
    Newest(String),
    /// Earliest date first, by the named date field.
    Oldest(String),
    RarityDesc,
    RarityAsc,
    /// Highest value of the named stat first.
    StatDesc(String),
    /// Ordered only by a caller-supplied comparator registered under the
    /// option's key. Without one, the original order is kept.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    /// Identifier used in the `sort` URL parameter.
    pub key: String,
    pub label: String,
    pub by: SortBy,
}
impl SortOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>, by: SortBy) -> Self {
        Self { key: key.into(), label: label.into(), by }
    }
}

/// A numeric range control.
#[derive(Debug, Clone, PartialEq)]
pub struct StatFilter {
    pub key: String,
    pub label: String,
    /// Slider bounds. Not enforced on the selected range.
    pub min: f64,
    pub max: f64,
}
impl StatFilter {
    pub fn new(key: impl Into<String>, label: impl Into<String>, min: f64, max: f64) -> Self {
        Self { key: key.into(), label: label.into(), min, max }
    }
}

/// A yes/no control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanFilter {
    pub key: String,
    pub label: String,
}
impl BooleanFilter {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into() }
    }
}

/// A fully resolved filter configuration for one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Fields searched by the free-text box (see [`Filterable::text()`](crate::Filterable::text)).
    pub search_fields: Vec<String>,
    pub sort_options: Vec<SortOption>,
    /// Sort key used when the state has none, or an unknown one.
    pub default_sort: String,
    pub rarity_options: Vec<Rarity>,
    pub status_options: Vec<String>,
    pub type_options: Vec<String>,
    pub category_options: Vec<String>,
    pub stat_filters: Vec<StatFilter>,
    pub boolean_filters: Vec<BooleanFilter>,
    /// Date field the date range applies to.
    pub date_field: String,
    pub page_size: usize,
}
impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search_fields: vec!["name".to_string(), "tags".to_string()],
            sort_options: vec![
                SortOption::new("a-z", "A-Z", SortBy::Alphabetical),
                SortOption::new("z-a", "Z-A", SortBy::ReverseAlphabetical),
            ],
            default_sort: "a-z".to_string(),
            rarity_options: Vec::new(),
            status_options: Vec::new(),
            type_options: Vec::new(),
            category_options: Vec::new(),
            stat_filters: Vec::new(),
            boolean_filters: Vec::new(),
            date_field: "updated_at".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
impl FilterConfig {
    /// Merges the layers: each field set in `overrides` wins over the
    /// preset's value, which wins over [`FilterConfig::default()`].
    pub fn resolve(preset: Preset, overrides: &FilterOverrides) -> Self {
        overrides.apply(preset.defaults())
    }

    pub fn sort_option(&self, key: &str) -> Option<&SortOption> {
        self.sort_options.iter().find(|option| option.key == key)
    }

    pub fn stat_filter(&self, key: &str) -> Option<&StatFilter> {
        self.stat_filters.iter().find(|filter| filter.key == key)
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            exn::bail!(ErrorKind::InvalidConfig("page size must be at least 1".to_string()));
        }
        if self.sort_option(&self.default_sort).is_none() {
            exn::bail!(ErrorKind::InvalidConfig(format!("default sort {:?} is not a sort option", self.default_sort)));
        }
        let inverted = |filter: &&StatFilter| filter.min.is_nan() || filter.max.is_nan() || filter.min > filter.max;
        if let Some(filter) = self.stat_filters.iter().find(inverted) {
            exn::bail!(ErrorKind::InvalidConfig(format!("stat filter {:?} has inverted bounds", filter.key)));
        }
        Ok(())
    }
}

/// Caller-supplied configuration. Every field that is set replaces the
/// preset's value for that field entirely (lists are not merged).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOverrides {
    pub search_fields: Option<Vec<String>>,
    pub sort_options: Option<Vec<SortOption>>,
    pub default_sort: Option<String>,
    pub rarity_options: Option<Vec<Rarity>>,
    pub status_options: Option<Vec<String>>,
    pub type_options: Option<Vec<String>>,
    pub category_options: Option<Vec<String>>,
    pub stat_filters: Option<Vec<StatFilter>>,
    pub boolean_filters: Option<Vec<BooleanFilter>>,
    pub date_field: Option<String>,
    pub page_size: Option<usize>,
}

macro_rules! apply_overrides {
    ($overrides:expr, $config:ident, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = &$overrides.$field {
                $config.$field = value.clone();
            }
        )*
    };
}

impl FilterOverrides {
    pub fn apply(&self, mut config: FilterConfig) -> FilterConfig {
        apply_overrides!(self, config, [
            search_fields,
            sort_options,
            default_sort,
            rarity_options,
            status_options,
            type_options,
            category_options,
            stat_filters,
            boolean_filters,
            date_field,
            page_size,
        ]);
        config
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
