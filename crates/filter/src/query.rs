//! URL query string encoding of [`FilterState`].
//!
//! Parameters, in the order they are written:
//!
//! | Key            | Field                        |
//! |----------------|------------------------------|
//! | `q`            | search                       |
//! | `category`     | category                     |
//! | `tags`         | tags (repeated)              |
//! | `rarity`       | rarity                       |
//! | `status`       | status                       |
//! | `type`         | variant                      |
//! | `startDate`    | date range start             |
//! | `endDate`      | date range end               |
//! | `min_<stat>`   | stat range lower bound       |
//! | `max_<stat>`   | stat range upper bound       |
//! | `flag_<key>`   | boolean filter               |
//! | `sort`         | sort key                     |
//! | `page`         | page, omitted when 1         |
//!
//! Unset fields are omitted. Reading never fails: a value that can't be
//! parsed leaves its field at the default, and unknown keys are ignored.

use url::form_urlencoded;
use wiki_content::models::Rarity;
use wiki_content::{parse_bool, parse_date};

use crate::state::{DateRange, FilterState, StatRange, canonical_tags};

const MIN_PREFIX: &str = "min_";
const MAX_PREFIX: &str = "max_";
const FLAG_PREFIX: &str = "flag_";

/// Writes `state` as a form-urlencoded query string, without a leading `?`.
///
/// # Examples
///
/// ```
/// use wiki_content::models::Rarity;
/// use wiki_filter::{FilterState, serialize_filter_state};
///
/// let state = FilterState { rarity: Some(Rarity::Ssr), sort: Some("a-z".into()), ..FilterState::default() };
/// assert_eq!(serialize_filter_state(&state), "rarity=SSR&sort=a-z");
/// ```
pub fn serialize_filter_state(state: &FilterState) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if !state.search.is_empty() {
        query.append_pair("q", &state.search);
    }
    if let Some(category) = &state.category {
        query.append_pair("category", category);
    }
    for tag in &state.tags {
        query.append_pair("tags", tag);
    }
    if let Some(rarity) = state.rarity {
        query.append_pair("rarity", rarity.as_str());
    }
    if let Some(status) = &state.status {
        query.append_pair("status", status);
    }
    if let Some(variant) = &state.variant {
        query.append_pair("type", variant);
    }
    if let Some(range) = &state.date_range {
        if let Some(start) = range.start {
            query.append_pair("startDate", &start.to_string());
        }
        if let Some(end) = range.end {
            query.append_pair("endDate", &end.to_string());
        }
    }
    for (key, range) in &state.stat_ranges {
        if let Some(min) = range.min {
            query.append_pair(&format!("{MIN_PREFIX}{key}"), &min.to_string());
        }
        if let Some(max) = range.max {
            query.append_pair(&format!("{MAX_PREFIX}{key}"), &max.to_string());
        }
    }
    for (key, value) in &state.boolean_filters {
        query.append_pair(&format!("{FLAG_PREFIX}{key}"), if *value { "true" } else { "false" });
    }
    if let Some(sort) = &state.sort {
        query.append_pair("sort", sort);
    }
    if state.page != 1 {
        query.append_pair("page", &state.page.to_string());
    }
    query.finish()
}

/// Reads a state from a query string, with or without a leading `?`.
///
/// The result is canonical (see [`FilterState::canonical()`]), so for every
/// canonical state `s`, `deserialize_filter_state(&serialize_filter_state(&s)) == s`.
///
/// # Examples
///
/// ```
/// use wiki_content::models::Rarity;
/// use wiki_filter::deserialize_filter_state;
///
/// let state = deserialize_filter_state("?rarity=ssr&page=two&utm_source=mail");
/// assert_eq!(state.rarity, Some(Rarity::Ssr));
/// assert_eq!(state.page, 1);
/// ```
pub fn deserialize_filter_state(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = FilterState::default();
    let mut tags = Vec::new();
    let mut dates = DateRange::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "q" => state.search = value.into_owned(),
            "category" => state.category = Some(value.into_owned()),
            "tags" => tags.push(value.into_owned()),
            "rarity" => state.rarity = value.parse::<Rarity>().ok(),
            "status" => state.status = Some(value.into_owned()),
            "type" => state.variant = Some(value.into_owned()),
            "startDate" => dates.start = parse_date(&value),
            "endDate" => dates.end = parse_date(&value),
            "sort" => state.sort = Some(value.into_owned()),
            "page" => state.page = value.trim().parse().unwrap_or(1),
            key => {
                if let Some(stat) = key.strip_prefix(MIN_PREFIX) {
                    let range = state.stat_ranges.entry(stat.to_string()).or_insert_with(StatRange::default);
                    range.min = parse_bound(&value);
                } else if let Some(stat) = key.strip_prefix(MAX_PREFIX) {
                    let range = state.stat_ranges.entry(stat.to_string()).or_insert_with(StatRange::default);
                    range.max = parse_bound(&value);
                } else if let Some(flag) = key.strip_prefix(FLAG_PREFIX) {
                    match parse_bool(&value) {
                        Some(enabled) => state.boolean_filters.insert(flag.to_string(), enabled),
                        None => state.boolean_filters.remove(flag),
                    };
                } else {
                    tracing::trace!(key, "ignoring unknown filter parameter");
                }
            },
        }
    }
    state.tags = canonical_tags(tags);
    state.date_range = Some(dates);
    state.canonical()
}

fn parse_bound(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|bound| bound.is_finite())
}
