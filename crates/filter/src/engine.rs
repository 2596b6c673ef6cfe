use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use wiki_content::models::{Language, Rarity};

use crate::config::{FilterConfig, FilterOverrides, SortBy};
use crate::filterable::Filterable;
use crate::preset::Preset;
use crate::query::{deserialize_filter_state, serialize_filter_state};
use crate::state::{DateRange, FilterState, StatRange};

/// Custom free-text predicate: `(record, trimmed query)`.
pub type SearchPredicate<T> = Box<dyn Fn(&T, &str) -> bool + Send + Sync>;
/// Custom ordering for one sort key.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Caller-side customization of a [`UnifiedFilter`].
pub struct FilterOptions<T> {
    pub overrides: FilterOverrides,
    /// Language of text fields for search and alphabetical sorting.
    pub language: Language,
    /// Replaces the built-in search over the configured fields.
    pub search: Option<SearchPredicate<T>>,
    /// Orderings keyed by sort key. These win over the built-in ones.
    pub comparators: HashMap<String, Comparator<T>>,
}
impl<T> Default for FilterOptions<T> {
    fn default() -> Self {
        Self {
            overrides: FilterOverrides::default(),
            language: Language::En,
            search: None,
            comparators: HashMap::new(),
        }
    }
}
impl<T> FilterOptions<T> {
    pub fn with_overrides(mut self, overrides: FilterOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_search(mut self, predicate: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        self.search = Some(Box::new(predicate));
        self
    }

    pub fn with_comparator(
        mut self,
        key: impl Into<String>,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparators.insert(key.into(), Box::new(comparator));
        self
    }
}

/// Filter, sort and pagination state of one listing page.
///
/// Owns the page's [`FilterState`] and recomputes the filtered, sorted view
/// of `data` whenever a handler changes it. Every handler that changes what
/// is shown (anything but [`set_page()`](Self::set_page)) returns to page 1.
///
/// Filtering is a conjunction of six stages, applied in order: free-text
/// search, category/type/status/rarity, tags, stat ranges, date range, then
/// boolean filters. Sorting is stable, so records that compare equal keep
/// their order in `data`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wiki_content::records::Item;
/// use wiki_filter::{FilterOptions, Preset, UnifiedFilter};
///
/// let items: Arc<[Item]> = Arc::from(Vec::new());
/// let mut filter = UnifiedFilter::new(Preset::Items, items, FilterOptions::default());
/// filter.from_query("?category=Currency&page=2");
/// assert_eq!(filter.active_filter_count(), 1);
/// assert_eq!(filter.to_query(), "category=Currency&page=2");
/// ```
pub struct UnifiedFilter<T: Filterable> {
    preset: Preset,
    config: FilterConfig,
    data: Arc<[T]>,
    options: FilterOptions<T>,
    state: FilterState,
    /// Positions in `data` of the filtered records, sorted.
    view: Vec<usize>,
}

impl<T: Filterable> UnifiedFilter<T> {
    pub fn new(preset: Preset, data: impl Into<Arc<[T]>>, options: FilterOptions<T>) -> Self {
        let config = FilterConfig::resolve(preset, &options.overrides);
        let mut filter = Self {
            preset,
            config,
            data: data.into(),
            options,
            state: FilterState::default(),
            view: Vec::new(),
        };
        filter.refresh();
        filter
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Replaces the underlying records, keeping the state.
    pub fn set_data(&mut self, data: impl Into<Arc<[T]>>) {
        self.data = data.into();
        self.refresh();
    }

    /// Every record passing the active filters, sorted.
    pub fn filtered_data(&self) -> Vec<&T> {
        self.view.iter().map(|&position| &self.data[position]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    /// The records on the current page.
    pub fn page_items(&self) -> Vec<&T> {
        let size = self.config.page_size.max(1);
        self.view
            .iter()
            .skip((self.state.page - 1).saturating_mul(size))
            .take(size)
            .map(|&position| &self.data[position])
            .collect()
    }

    /// Number of pages, at least 1 even when nothing matches.
    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.config.page_size.max(1)).max(1)
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.active_filter_count()
    }

    /// The sort key in effect: the state's if it is known, otherwise the
    /// configured default.
    pub fn active_sort(&self) -> &str {
        match &self.state.sort {
            Some(key) if self.options.comparators.contains_key(key) || self.config.sort_option(key).is_some() => {
                key.as_str()
            },
            _ => self.config.default_sort.as_str(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.update(|state| state.search = search.into());
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.update(|state| state.category = category);
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.update(|state| state.tags = tags);
    }

    /// Adds `tag` if it isn't selected, removes it if it is.
    pub fn toggle_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_string();
        self.update(|state| {
            if let Some(position) = state.tags.iter().position(|existing| *existing == tag) {
                state.tags.remove(position);
            } else {
                state.tags.push(tag);
            }
        });
    }

    pub fn set_sort(&mut self, sort: Option<String>) {
        self.update(|state| state.sort = sort);
    }

    pub fn set_rarity(&mut self, rarity: Option<Rarity>) {
        self.update(|state| state.rarity = rarity);
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.update(|state| state.status = status);
    }

    pub fn set_type(&mut self, variant: Option<String>) {
        self.update(|state| state.variant = variant);
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.update(|state| state.date_range = range);
    }

    /// Sets (or with `None` removes) the range on one stat.
    pub fn set_stat_range(&mut self, key: impl Into<String>, range: Option<StatRange>) {
        let key = key.into();
        self.update(|state| match range {
            Some(range) => {
                state.stat_ranges.insert(key, range);
            },
            None => {
                state.stat_ranges.remove(&key);
            },
        });
    }

    /// Sets (or with `None` removes) one boolean filter.
    pub fn set_boolean(&mut self, key: impl Into<String>, value: Option<bool>) {
        let key = key.into();
        self.update(|state| match value {
            Some(value) => {
                state.boolean_filters.insert(key, value);
            },
            None => {
                state.boolean_filters.remove(&key);
            },
        });
    }

    /// Moves to `page`, clamped to `1..=total_pages()`.
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.clamp(1, self.total_pages());
    }

    /// Removes every filter. The sort is kept.
    pub fn clear_filters(&mut self) {
        let sort = self.state.sort.take();
        self.replace_state(FilterState { sort, ..FilterState::default() });
    }

    /// Replaces the whole state, as given (after canonicalization).
    pub fn replace_state(&mut self, state: FilterState) {
        self.state = state.canonical();
        self.refresh();
    }

    /// The state as a URL query string, without a leading `?`.
    pub fn to_query(&self) -> String {
        serialize_filter_state(&self.state)
    }

    /// Replaces the state with the one encoded in `query`.
    pub fn from_query(&mut self, query: &str) {
        self.replace_state(deserialize_filter_state(query));
    }

    fn update(&mut self, change: impl FnOnce(&mut FilterState)) {
        change(&mut self.state);
        self.state.page = 1;
        self.state = std::mem::take(&mut self.state).canonical();
        self.refresh();
    }

    fn refresh(&mut self) {
        let mut view: Vec<usize> = (0..self.data.len()).filter(|&position| self.matches(&self.data[position])).collect();
        self.sort(&mut view);
        tracing::trace!(preset = %self.preset, total = self.data.len(), shown = view.len(), "filter refreshed");
        self.view = view;
    }

    /// Whether `record` passes every active stage.
    fn matches(&self, record: &T) -> bool {
        self.matches_search(record)
            && self.matches_facets(record)
            && self.matches_tags(record)
            && self.matches_stats(record)
            && self.matches_dates(record)
            && self.matches_flags(record)
    }

    fn matches_search(&self, record: &T) -> bool {
        let query = self.state.search.trim();
        if query.is_empty() {
            return true;
        }
        if let Some(predicate) = &self.options.search {
            return predicate(record, query);
        }
        let needle = query.to_lowercase();
        self.config
            .search_fields
            .iter()
            .flat_map(|field| record.text(field, self.options.language))
            .any(|text| text.to_lowercase().contains(&needle))
    }

    fn matches_facets(&self, record: &T) -> bool {
        fn same(wanted: Option<&String>, actual: Option<&str>) -> bool {
            match wanted {
                None => true,
                Some(wanted) => actual.is_some_and(|actual| actual.to_lowercase() == wanted.to_lowercase()),
            }
        }
        same(self.state.category.as_ref(), record.category())
            && same(self.state.variant.as_ref(), record.variant())
            && same(self.state.status.as_ref(), record.status())
            && self.state.rarity.is_none_or(|rarity| record.rarity() == Some(rarity))
    }

    fn matches_tags(&self, record: &T) -> bool {
        if self.state.tags.is_empty() {
            return true;
        }
        let wanted: Vec<String> = self.state.tags.iter().map(|tag| tag.to_lowercase()).collect();
        record.tags().iter().any(|tag| wanted.contains(&tag.to_lowercase()))
    }

    fn matches_stats(&self, record: &T) -> bool {
        self.state
            .stat_ranges
            .iter()
            .all(|(key, range)| record.stat(key).is_some_and(|value| range.contains(value)))
    }

    fn matches_dates(&self, record: &T) -> bool {
        match &self.state.date_range {
            None => true,
            Some(range) => record.date(&self.config.date_field).is_some_and(|date| range.contains(date)),
        }
    }

    fn matches_flags(&self, record: &T) -> bool {
        self.state.boolean_filters.iter().all(|(key, wanted)| record.flag(key) == Some(*wanted))
    }

    fn sort(&self, view: &mut [usize]) {
        let key = self.active_sort();
        let data = &self.data;
        if let Some(comparator) = self.options.comparators.get(key) {
            view.sort_by(|&a, &b| comparator(&data[a], &data[b]));
            return;
        }
        let Some(option) = self.config.sort_option(key) else {
            return;
        };
        let language = self.options.language;
        match &option.by {
            SortBy::Alphabetical => view.sort_by_cached_key(|&position| title_key(&data[position], language)),
            SortBy::ReverseAlphabetical => {
                view.sort_by(|&a, &b| title_key(&data[b], language).cmp(&title_key(&data[a], language)))
            },
            SortBy::Newest(field) => view.sort_by(|&a, &b| missing_last(data[a].date(field), data[b].date(field), true)),
            SortBy::Oldest(field) => {
                view.sort_by(|&a, &b| missing_last(data[a].date(field), data[b].date(field), false))
            },
            SortBy::RarityDesc => view.sort_by(|&a, &b| missing_last(data[a].rarity(), data[b].rarity(), true)),
            SortBy::RarityAsc => view.sort_by(|&a, &b| missing_last(data[a].rarity(), data[b].rarity(), false)),
            SortBy::StatDesc(key) => view.sort_by(|&a, &b| match (data[a].stat(key), data[b].stat(key)) {
                (Some(a), Some(b)) => b.total_cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
            SortBy::Custom => {},
        }
    }
}

fn title_key<T: Filterable>(record: &T, language: Language) -> String {
    record.title().get(language).to_lowercase()
}

/// Orders present values (descending or ascending) before missing ones.
fn missing_last<V: Ord>(a: Option<V>, b: Option<V>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;
    use time::macros::date;
    use wiki_content::records::{Event, Swimsuit};
    use wiki_content::{SourceFormat, parse};

    const SWIMSUITS: &str = "\
id,unique_key,updated_at,name,character,rarity,type,pow,tec,stm,release_date,is_limited,tags
1,venus-blue,2024-01-01,Venus Blue,kasumi,SSR,POW,1500,800,900,2024-03-01,yes,\"summer,limited\"
2,coral-reef,2024-01-01,coral reef,ayane,SR,TEC,900,1400,700,2024-01-15,no,summer
3,astral,2024-01-01,Astral,honoka,SSR,STM,1100,700,1600,2023-12-24,no,winter
4,bloom,2024-01-01,Bloom,kasumi,R,POW,,,,,no,
5,midnight,2024-01-01,Midnight,marie,SSR,TEC,1300,1300,800,2024-02-10,yes,\"winter,limited\"
6,dawn,2024-01-01,Dawn,ayane,N,STM,300,200,400,2022-06-01,no,summer
";

    fn swimsuits() -> Arc<[Swimsuit]> {
        parse::<Swimsuit>(SourceFormat::Csv, SWIMSUITS.as_bytes()).unwrap().records.into()
    }

    fn filter() -> UnifiedFilter<Swimsuit> {
        UnifiedFilter::new(Preset::Swimsuits, swimsuits(), FilterOptions::default())
    }

    fn keys<T: Filterable>(records: Vec<&T>) -> Vec<&str> {
        records.into_iter().map(|record| record.unique_key()).collect()
    }

    #[test]
    fn test_rarity_and_alphabetical_from_query() {
        let mut filter = filter();
        filter.from_query("?rarity=SSR&sort=a-z");
        assert_eq!(
            *filter.state(),
            FilterState { rarity: Some(Rarity::Ssr), sort: Some("a-z".into()), ..FilterState::default() }
        );
        assert_eq!(keys(filter.filtered_data()), vec!["astral", "midnight", "venus-blue"]);
        assert_eq!(filter.to_query(), "rarity=SSR&sort=a-z");

        let mut restored = self::filter();
        restored.from_query(&filter.to_query());
        assert_eq!(restored.state(), filter.state());
        assert_eq!(keys(restored.filtered_data()), keys(filter.filtered_data()));
    }

    #[test]
    fn test_default_sort_is_rarity_desc_and_stable() {
        let filter = filter();
        assert_eq!(filter.active_sort(), "rarity-desc");
        assert_eq!(keys(filter.filtered_data()), vec!["venus-blue", "astral", "midnight", "coral-reef", "bloom", "dawn"]);
    }

    #[rstest]
    #[case("z-a", &["venus-blue", "midnight", "dawn", "coral-reef", "bloom", "astral"])]
    #[case("a-z", &["astral", "bloom", "coral-reef", "dawn", "midnight", "venus-blue"])]
    #[case("newest", &["venus-blue", "midnight", "coral-reef", "astral", "dawn", "bloom"])]
    #[case("oldest", &["dawn", "astral", "coral-reef", "midnight", "venus-blue", "bloom"])]
    #[case("rarity-asc", &["dawn", "bloom", "coral-reef", "venus-blue", "astral", "midnight"])]
    #[case("pow-desc", &["venus-blue", "midnight", "astral", "coral-reef", "dawn", "bloom"])]
    #[case("total-desc", &["astral", "midnight", "venus-blue", "coral-reef", "dawn", "bloom"])]
    #[case("no-such-sort", &["venus-blue", "astral", "midnight", "coral-reef", "bloom", "dawn"])]
    fn test_sort(#[case] sort: &str, #[case] expected: &[&str]) {
        let mut filter = filter();
        filter.set_sort(Some(sort.to_string()));
        assert_eq!(keys(filter.filtered_data()), expected);
    }

    #[test]
    fn test_search_is_case_insensitive_over_configured_fields() {
        let mut filter = filter();
        filter.set_search("  KASUMI ");
        assert_eq!(keys(filter.filtered_data()), vec!["venus-blue", "bloom"]);
        filter.set_search("reef");
        assert_eq!(keys(filter.filtered_data()), vec!["coral-reef"]);
        // Tags are a search field of the swimsuit preset.
        filter.set_search("winter");
        assert_eq!(keys(filter.filtered_data()), vec!["astral", "midnight"]);
    }

    #[test]
    fn test_custom_search_and_comparator() {
        let options = FilterOptions::default()
            .with_search(|swimsuit: &Swimsuit, query: &str| swimsuit.character.starts_with(query))
            .with_comparator("a-z", |a: &Swimsuit, b: &Swimsuit| b.meta.id.cmp(&a.meta.id));
        let mut filter = UnifiedFilter::new(Preset::Swimsuits, swimsuits(), options);
        filter.set_search("ay");
        filter.set_sort(Some("a-z".into()));
        assert_eq!(keys(filter.filtered_data()), vec!["dawn", "coral-reef"]);
    }

    #[test]
    fn test_comparator_key_counts_as_known_sort() {
        let options =
            FilterOptions::default().with_comparator("character", |a: &Swimsuit, b: &Swimsuit| a.character.cmp(&b.character));
        let mut filter = UnifiedFilter::new(Preset::Swimsuits, swimsuits(), options);
        filter.set_sort(Some("character".into()));
        assert_eq!(filter.active_sort(), "character");
        assert_eq!(keys(filter.filtered_data())[..2], ["coral-reef", "dawn"]);
    }

    #[rstest]
    #[case("type=pow", &["venus-blue", "bloom"])]
    #[case("type=TEC&rarity=SSR", &["midnight"])]
    #[case("tags=LIMITED&tags=nope", &["venus-blue", "midnight"])]
    #[case("min_pow=1000&max_pow=1300", &["astral", "midnight"])]
    #[case("max_stm=700", &["coral-reef", "dawn"])]
    #[case("startDate=2024-01-15&endDate=2024-03-01", &["venus-blue", "midnight", "coral-reef"])]
    #[case("endDate=2023-12-31", &["astral", "dawn"])]
    #[case("flag_is_limited=true", &["venus-blue", "midnight"])]
    #[case("flag_is_limited=false&flag_has_malfunction=false", &["astral", "coral-reef", "bloom", "dawn"])]
    #[case("category=Currency", &[])]
    #[case("status=Active", &[])]
    fn test_filter_stages(#[case] query: &str, #[case] expected: &[&str]) {
        let mut filter = filter();
        filter.from_query(query);
        assert_eq!(keys(filter.filtered_data()), expected);
    }

    #[test]
    fn test_removing_a_filter_never_removes_records() {
        let full = FilterState {
            search: "a".into(),
            tags: vec!["summer".into(), "winter".into()],
            rarity: Some(Rarity::Ssr),
            variant: Some("POW".into()),
            date_range: Some(DateRange::new(Some(date!(2023 - 01 - 01)), None)),
            stat_ranges: BTreeMap::from([("pow".into(), StatRange::at_least(1000.0))]),
            boolean_filters: BTreeMap::from([("is_limited".into(), true)]),
            ..FilterState::default()
        };
        let removals: Vec<fn(&mut FilterState)> = vec![
            |state: &mut FilterState| state.search.clear(),
            |state: &mut FilterState| state.tags.clear(),
            |state: &mut FilterState| state.rarity = None,
            |state: &mut FilterState| state.variant = None,
            |state: &mut FilterState| state.date_range = None,
            |state: &mut FilterState| state.stat_ranges.clear(),
            |state: &mut FilterState| state.boolean_filters.clear(),
        ];

        let mut filter = filter();
        filter.replace_state(full.clone());
        assert_eq!(filter.active_filter_count(), 7);
        let narrowed: Vec<String> = keys(filter.filtered_data()).into_iter().map(str::to_string).collect();
        for remove in removals {
            let mut relaxed = full.clone();
            remove(&mut relaxed);
            filter.replace_state(relaxed);
            let widened = keys(filter.filtered_data());
            assert!(narrowed.iter().all(|key| widened.contains(&key.as_str())), "{narrowed:?} not in {widened:?}");
            // Every record still shown passes every remaining stage.
            assert!(filter.filtered_data().into_iter().all(|record| filter.matches(record)));
        }
    }

    #[test]
    fn test_handlers_reset_page() {
        let options = FilterOptions::default()
            .with_overrides(FilterOverrides { page_size: Some(2), ..FilterOverrides::default() });
        let mut filter = UnifiedFilter::new(Preset::Swimsuits, swimsuits(), options);
        assert_eq!(filter.total_pages(), 3);

        filter.set_page(3);
        assert_eq!(keys(filter.page_items()), vec!["bloom", "dawn"]);
        filter.set_page(99);
        assert_eq!(filter.state().page, 3);
        filter.set_page(0);
        assert_eq!(filter.state().page, 1);

        filter.set_page(2);
        filter.toggle_tag("summer");
        assert_eq!(filter.state().page, 1);
        assert_eq!(filter.state().tags, vec!["summer"]);
        filter.set_page(2);
        filter.toggle_tag("summer");
        assert!(filter.state().tags.is_empty());
        assert_eq!(filter.state().page, 1);

        filter.set_page(2);
        filter.set_stat_range("pow", Some(StatRange::at_least(1.0)));
        assert_eq!(filter.state().page, 1);
        filter.set_page(2);
        filter.set_boolean("is_limited", Some(false));
        assert_eq!(filter.state().page, 1);
        assert_eq!(filter.to_query(), "min_pow=1&flag_is_limited=false");
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut filter = filter();
        filter.from_query("q=a&rarity=SSR&sort=newest&page=2&min_pow=1");
        assert_eq!(filter.active_filter_count(), 3);
        filter.clear_filters();
        assert_eq!(filter.active_filter_count(), 0);
        assert_eq!(filter.to_query(), "sort=newest");
        assert_eq!(filter.filtered_len(), 6);
    }

    #[test]
    fn test_empty_results_have_one_page() {
        let mut filter = filter();
        filter.set_search("nothing like this");
        assert!(filter.filtered_data().is_empty());
        assert!(filter.page_items().is_empty());
        assert_eq!(filter.total_pages(), 1);
    }

    #[test]
    fn test_localized_alphabetical_sort() {
        let events = parse::<Event>(
            SourceFormat::Json,
            r#"[
                {"id": "1", "unique_key": "a", "updated_at": "2024-01-01", "name": {"en": "Alpha", "jp": "ガンマ"}, "type": "Main", "event_status": "Active"},
                {"id": "2", "unique_key": "b", "updated_at": "2024-01-01", "name": {"en": "Beta", "jp": "アルファ"}, "type": "Main", "event_status": "Ended"}
            ]"#
            .as_bytes(),
        )
        .unwrap()
        .records;
        let mut english = UnifiedFilter::new(Preset::Events, events.clone(), FilterOptions::default());
        english.set_sort(Some("a-z".into()));
        assert_eq!(keys(english.filtered_data()), vec!["a", "b"]);

        let mut japanese =
            UnifiedFilter::new(Preset::Events, events, FilterOptions::default().with_language(Language::Jp));
        japanese.set_sort(Some("a-z".into()));
        assert_eq!(keys(japanese.filtered_data()), vec!["b", "a"]);
        japanese.set_search("ガンマ");
        assert_eq!(keys(japanese.filtered_data()), vec!["a"]);
    }
}
