use std::collections::BTreeMap;
use time::Date;
use wiki_content::models::Rarity;

/// Inclusive date bounds. At least one bound is set in a canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}
impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Inclusive numeric bounds on one stat. At least one bound is set, and
/// both are finite, in a canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}
impl StatRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn at_most(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Drops non-finite bounds.
    fn canonical(self) -> Self {
        Self {
            min: self.min.filter(|bound| bound.is_finite()),
            max: self.max.filter(|bound| bound.is_finite()),
        }
    }
}

/// Everything a listing page's filter controls hold.
///
/// The whole state can be written to and read back from a URL query string
/// (see [`serialize_filter_state()`](crate::serialize_filter_state)).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Free-text search. Blank means no search.
    pub search: String,
    pub category: Option<String>,
    /// Any overlap with a record's tags matches.
    pub tags: Vec<String>,
    /// Active sort option key. `None` uses the configured default.
    pub sort: Option<String>,
    pub rarity: Option<Rarity>,
    pub status: Option<String>,
    /// The "type" facet (event type, swimsuit attribute, accessory slot...).
    pub variant: Option<String>,
    pub date_range: Option<DateRange>,
    pub stat_ranges: BTreeMap<String, StatRange>,
    pub boolean_filters: BTreeMap<String, bool>,
    /// 1-based.
    pub page: usize,
}
impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            tags: Vec::new(),
            sort: None,
            rarity: None,
            status: None,
            variant: None,
            date_range: None,
            stat_ranges: BTreeMap::new(),
            boolean_filters: BTreeMap::new(),
            page: 1,
        }
    }
}
impl FilterState {
    /// Number of active filters. Each stat range and each boolean filter
    /// counts separately. Sort and page are not filters.
    pub fn active_filter_count(&self) -> usize {
        let singles = [
            !self.search.trim().is_empty(),
            self.category.is_some(),
            !self.tags.is_empty(),
            self.rarity.is_some(),
            self.status.is_some(),
            self.variant.is_some(),
            self.date_range.is_some(),
        ];
        singles.into_iter().filter(|active| *active).count() + self.stat_ranges.len() + self.boolean_filters.len()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// The minimal equivalent state: blank strings become `None`, tags are
    /// trimmed and de-duplicated, empty ranges are removed and the page is at
    /// least 1.
    pub fn canonical(mut self) -> Self {
        self.category = non_blank(self.category);
        self.sort = non_blank(self.sort);
        self.status = non_blank(self.status);
        self.variant = non_blank(self.variant);
        self.tags = canonical_tags(self.tags);
        self.date_range = self.date_range.filter(|range| !range.is_empty());
        self.stat_ranges = self
            .stat_ranges
            .into_iter()
            .filter(|(key, _)| !key.trim().is_empty())
            .map(|(key, range)| (key, range.canonical()))
            .filter(|(_, range)| !range.is_empty())
            .collect();
        self.boolean_filters.retain(|key, _| !key.trim().is_empty());
        self.page = self.page.max(1);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}

pub(crate) fn canonical_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut canonical: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !canonical.iter().any(|existing| existing == tag) {
            canonical.push(tag.to_string());
        }
    }
    canonical
}
