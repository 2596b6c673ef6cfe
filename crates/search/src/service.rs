use exn::ResultExt;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::instrument;
use wiki_content::ContentKind;
use wiki_content::models::{Language, get_localized_value};
use wiki_library::ContentLoader;

use crate::error::{ErrorKind, Result};
use crate::index::{Document, IndexSet, MatchKind};
use crate::tokenizer::{normalize, tokenize};

/// Service-wide search defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Result limit when a search doesn't set one.
    pub default_limit: usize,
    /// Languages to build indexes for. English is always indexed.
    pub languages: Vec<Language>,
    /// Language used when a search doesn't set one.
    pub default_language: Language,
}
impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            languages: Language::ALL.to_vec(),
            default_language: Language::En,
        }
    }
}
impl SearchSettings {
    fn indexed_languages(&self) -> Vec<Language> {
        let mut languages = vec![Language::En];
        for language in &self.languages {
            if !languages.contains(language) {
                languages.push(*language);
            }
        }
        languages
    }
}

/// Per-search options. Unset fields use the [`SearchSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    /// Content types to search. Empty means all of them.
    pub types: Vec<ContentKind>,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub document: Arc<Document>,
    /// The title in the language that was searched.
    pub title: String,
    pub match_kind: MatchKind,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// At most `limit` results, best first.
    pub results: Vec<SearchResult>,
    /// Number of matching documents before the limit was applied.
    pub total: usize,
    pub has_more: bool,
    pub search_time: Duration,
}
impl SearchResponse {
    fn empty(started: Instant) -> Self {
        Self { results: Vec::new(), total: 0, has_more: false, search_time: started.elapsed() }
    }
}

/// Free-text search across every content type.
///
/// Indexes are built from the loader's collections by
/// [`build_indexes()`](Self::build_indexes) and replaced wholesale on every
/// build. Searching never loads anything: before the first build every
/// search comes back empty.
///
/// Builds are not coalesced. Two concurrent builds both run, and whichever
/// finishes last is the one that stays. Both see the same loaded content, so
/// the result is the same either way.
pub struct SearchIndexService {
    loader: ContentLoader,
    settings: SearchSettings,
    indexes: RwLock<Option<Arc<IndexSet>>>,
}

impl SearchIndexService {
    pub fn new(loader: ContentLoader, settings: SearchSettings) -> Self {
        Self { loader, settings, indexes: RwLock::new(None) }
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Initializes the loader, then indexes everything it holds.
    #[instrument(skip(self))]
    pub async fn build_indexes(&self) -> Result<()> {
        if let Err(err) = self.loader.initialize().await {
            let cause = (*err).clone();
            return Err(err).or_raise(|| ErrorKind::Content(cause));
        }

        let started = Instant::now();
        let languages = self.settings.indexed_languages();
        let collections = ContentKind::ALL.into_iter().filter_map(|kind| self.loader.collection_of(kind));
        let indexes = IndexSet::build(collections, &languages);
        let documents = indexes.document_count();
        *self.indexes.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(indexes));
        tracing::info!(documents, languages = languages.len(), elapsed = ?started.elapsed(), "search indexes built");
        Ok(())
    }

    fn snapshot(&self) -> Option<Arc<IndexSet>> {
        self.indexes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_built(&self) -> bool {
        self.indexes.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Number of indexed documents, zero before the first build.
    pub fn document_count(&self) -> usize {
        self.snapshot().map_or(0, |indexes| indexes.document_count())
    }

    /// Searches for documents sharing at least one token with `query`.
    ///
    /// Results are ranked by [`MatchKind`] plus one point per distinct query
    /// token matched, then by content type, then by position in the source.
    pub fn search(&self, query: &str, options: &SearchOptions) -> SearchResponse {
        let started = Instant::now();
        let tokens = distinct_tokens(query);
        let Some(indexes) = self.snapshot().filter(|_| !tokens.is_empty()) else {
            return SearchResponse::empty(started);
        };
        let language = indexes.resolve_language(options.language.unwrap_or(self.settings.default_language));
        let limit = options.limit.unwrap_or(self.settings.default_limit);
        let normalized = normalize(query);

        let mut scored = Vec::new();
        for (kind, index) in indexes.kinds(&options.types) {
            for (position, matched) in index.candidates(language, &tokens) {
                let match_kind = index.classify(language, position, &normalized, &tokens);
                scored.push((match_kind.base_score() + matched, kind, position, match_kind, index));
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let total = scored.len();
        let results = scored
            .into_iter()
            .take(limit)
            .map(|(score, _, position, match_kind, index)| {
                let document = Arc::clone(index.document(position));
                let title = get_localized_value(&document.title, language).to_string();
                SearchResult { document, title, match_kind, score }
            })
            .collect();
        let search_time = started.elapsed();
        tracing::debug!(query, %language, total, elapsed = ?search_time, "search");
        SearchResponse { results, total, has_more: total > limit, search_time }
    }

    /// Number of matching documents per content type, in the default
    /// language. Every type is present in the map.
    pub fn type_counts(&self, query: &str) -> BTreeMap<ContentKind, usize> {
        let mut counts: BTreeMap<ContentKind, usize> = ContentKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
        let tokens = distinct_tokens(query);
        let Some(indexes) = self.snapshot().filter(|_| !tokens.is_empty()) else {
            return counts;
        };
        let language = indexes.resolve_language(self.settings.default_language);
        for (kind, index) in indexes.kinds(&[]) {
            counts.insert(kind, index.candidates(language, &tokens).len());
        }
        counts
    }
}

fn distinct_tokens(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query).into_iter().filter(|token| seen.insert(token.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiki_cache::Cache;
    use wiki_library::Sources;
    use wiki_storage::backend::MockBackend;

    const CHARACTERS: &str = "\
id,unique_key,updated_at,name,name_jp,hobby,tags
1,kasumi-alpha,2024-01-01,Kasumi Alpha,,,
2,kasumi,2024-01-01,Kasumi,かすみ,Cooking,ninja
3,phase-kasumi,2024-01-01,Phase Kasumi,,,
4,ayane,2024-01-01,Ayane,あやね,Fortune telling,\"ninja,kasumi\"
5,hitomi,2024-01-01,Hitomi,,Sparring with Kasumi,
6,marie,2024-01-01,Marie Rose,,Cooking,
";

    fn fixtures() -> Arc<MockBackend> {
        Arc::new(MockBackend::with_files([
            ("characters.csv", CHARACTERS),
            (
                "events.json",
                r#"[
                    {"id": "1", "unique_key": "summer-festival", "updated_at": "2024-07-01", "name": "Summer Festival", "type": "Event", "event_status": "Active"},
                    {"id": "2", "unique_key": "summer-splash", "updated_at": "2024-07-02", "name": "Summer Splash", "type": "Daily", "event_status": "Upcoming"}
                ]"#,
            ),
            ("swimsuits.csv", "id,unique_key,updated_at,name,character,rarity\n1,mist,2024-01-01,Mist,kasumi,SSR\n"),
            ("items.csv", "id,unique_key,updated_at,name,category,rarity\n1,gem,2024-01-01,Gem,Currency,SSR\n"),
            (
                "guides.json",
                r#"[{"id": "1", "unique_key": "start", "updated_at": "2024-01-01", "title": "Getting Started", "category": "Basics"}]"#,
            ),
            (
                "gachas.json",
                r#"[{"id": "1", "unique_key": "summer-gacha", "updated_at": "2024-07-01", "name": "Summer Gacha", "gacha_status": "Active"}]"#,
            ),
            ("episodes.csv", "id,unique_key,updated_at,title,type\n1,arrival,2024-01-01,Arrival,Main\n"),
            (
                "tools.json",
                r#"[{"id": "1", "unique_key": "calc", "updated_at": "2024-01-01", "name": "Calculator", "category": "Utility"}]"#,
            ),
            ("accessories.csv", "id,unique_key,updated_at,name,rarity,slot\n1,ribbon,2024-01-01,Ribbon,SR,Head\n"),
            ("missions.csv", "id,unique_key,updated_at,name,type\n1,login,2024-01-01,Daily Login,Daily\n"),
            (
                "quizzes.json",
                r#"[{"id": "1", "unique_key": "lore", "updated_at": "2024-01-01", "title": "Lore Quiz", "category": "Lore", "difficulty": "Easy"}]"#,
            ),
        ]))
    }

    fn service(backend: &Arc<MockBackend>) -> SearchIndexService {
        let loader = ContentLoader::new(backend.clone(), Arc::new(Cache::new()), Sources::default());
        let settings = SearchSettings { languages: vec![Language::En, Language::Jp], ..SearchSettings::default() };
        SearchIndexService::new(loader, settings)
    }

    async fn built() -> SearchIndexService {
        let service = service(&fixtures());
        service.build_indexes().await.unwrap();
        service
    }

    fn keys(response: &SearchResponse) -> Vec<&str> {
        response.results.iter().map(|result| result.document.unique_key.as_str()).collect()
    }

    fn characters_only() -> SearchOptions {
        SearchOptions { types: vec![ContentKind::Character], ..SearchOptions::default() }
    }

    #[tokio::test]
    async fn test_ranked_by_match_kind() {
        let service = built().await;
        let response = service.search("kasumi", &characters_only());

        assert!(response.results.iter().all(|result| result.document.kind == ContentKind::Character));
        assert_eq!(keys(&response), vec!["kasumi", "kasumi-alpha", "phase-kasumi", "ayane", "hitomi"]);
        let kinds: Vec<MatchKind> = response.results.iter().map(|result| result.match_kind).collect();
        assert_eq!(
            kinds,
            vec![MatchKind::Exact, MatchKind::Prefix, MatchKind::Substring, MatchKind::Tag, MatchKind::Token]
        );
        let scores: Vec<u32> = response.results.iter().map(|result| result.score).collect();
        assert_eq!(scores, vec![101, 76, 51, 26, 11]);
        assert_eq!(response.total, 5);
        assert!(!response.has_more);
    }

    #[tokio::test]
    async fn test_all_types_searched_by_default() {
        let service = built().await;
        let response = service.search("kasumi", &SearchOptions::default());
        assert_eq!(response.total, 6);
        let last = response.results.last().unwrap();
        assert_eq!(last.document.kind, ContentKind::Swimsuit);
        assert_eq!(last.match_kind, MatchKind::Token);
    }

    #[tokio::test]
    async fn test_ties_follow_type_then_source_order() {
        let service = built().await;
        let response = service.search("Summer", &SearchOptions::default());
        assert_eq!(keys(&response), vec!["summer-festival", "summer-splash", "summer-gacha"]);
        assert!(response.results.iter().all(|result| result.score == 76));
    }

    #[tokio::test]
    async fn test_distinct_tokens_add_to_score() {
        let service = built().await;
        let response = service.search("Summer Splash", &SearchOptions::default());
        assert_eq!(keys(&response), vec!["summer-splash", "summer-festival", "summer-gacha"]);
        let scores: Vec<u32> = response.results.iter().map(|result| result.score).collect();
        assert_eq!(scores, vec![102, 11, 11]);
        assert_eq!(response.results[0].match_kind, MatchKind::Exact);

        // Repeating a token doesn't count it twice.
        assert_eq!(service.search("splash splash", &SearchOptions::default()).results[0].score, 11);
    }

    #[rstest]
    #[case(Some(2), 2, true)]
    #[case(Some(5), 5, false)]
    #[case(Some(0), 0, true)]
    #[case(None, 5, false)]
    #[tokio::test]
    async fn test_limit(#[case] limit: Option<usize>, #[case] returned: usize, #[case] has_more: bool) {
        let service = built().await;
        let options = SearchOptions { limit, ..characters_only() };
        let response = service.search("kasumi", &options);
        assert_eq!(response.results.len(), returned);
        assert_eq!(response.total, 5);
        assert_eq!(response.has_more, has_more);
    }

    #[tokio::test]
    async fn test_localized_search() {
        let service = built().await;
        let japanese = SearchOptions { language: Some(Language::Jp), ..characters_only() };

        let response = service.search("かすみ", &japanese);
        assert_eq!(keys(&response), vec!["kasumi"]);
        assert_eq!(response.results[0].match_kind, MatchKind::Exact);
        assert_eq!(response.results[0].title, "かすみ");

        // Untranslated titles are indexed through their English fallback.
        let response = service.search("kasumi", &japanese);
        assert_eq!(keys(&response)[0], "kasumi-alpha");
        assert!(!keys(&response).contains(&"kasumi"));

        assert_eq!(service.search("かすみ", &characters_only()).total, 0);
    }

    #[tokio::test]
    async fn test_unindexed_language_falls_back_to_english() {
        let service = built().await;
        let korean = SearchOptions { language: Some(Language::Kr), ..characters_only() };
        let response = service.search("kasumi", &korean);
        assert_eq!(keys(&response)[0], "kasumi");
        assert_eq!(response.results[0].title, "Kasumi");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("?!")]
    #[case("nothing-matches-this")]
    #[tokio::test]
    async fn test_no_results(#[case] query: &str) {
        let service = built().await;
        let response = service.search(query, &SearchOptions::default());
        assert!(response.results.is_empty());
        assert_eq!(response.total, 0);
        assert!(!response.has_more);
    }

    #[test]
    fn test_unbuilt_index_is_empty() {
        let service = service(&fixtures());
        assert!(!service.is_built());
        assert_eq!(service.document_count(), 0);
        assert_eq!(service.search("kasumi", &SearchOptions::default()).total, 0);
        let counts = service.type_counts("kasumi");
        assert_eq!(counts.len(), ContentKind::ALL.len());
        assert!(counts.values().all(|count| *count == 0));
    }

    #[tokio::test]
    async fn test_type_counts() {
        let service = built().await;
        let counts = service.type_counts("kasumi");
        assert_eq!(counts.len(), ContentKind::ALL.len());
        assert_eq!(counts[&ContentKind::Character], 5);
        assert_eq!(counts[&ContentKind::Swimsuit], 1);
        assert_eq!(counts.values().sum::<usize>(), 6);
        assert_eq!(service.type_counts("summer")[&ContentKind::Gacha], 1);
    }

    #[tokio::test]
    async fn test_build_counts_documents() {
        let service = built().await;
        assert!(service.is_built());
        assert_eq!(service.document_count(), 17);
    }

    #[tokio::test]
    async fn test_concurrent_builds_share_one_load() {
        let backend = fixtures();
        let service = service(&backend);
        let (a, b) = tokio::join!(service.build_indexes(), service.build_indexes());
        a.unwrap();
        b.unwrap();
        assert_eq!(backend.total_reads(), ContentKind::ALL.len());
        assert_eq!(service.document_count(), 17);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_index_unbuilt() {
        let backend = fixtures();
        backend.remove("tools.json").await;
        let service = service(&backend);

        let err = service.build_indexes().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Content(cause) if cause.kind() == ContentKind::Tool));
        assert!(!err.is_retryable());
        assert!(!service.is_built());

        backend
            .put(
                "tools.json",
                r#"[{"id": "1", "unique_key": "calc", "updated_at": "2024-01-01", "name": "Calculator", "category": "Utility"}]"#,
            )
            .await;
        service.build_indexes().await.unwrap();
        assert_eq!(service.document_count(), 17);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_indexes() {
        let backend = fixtures();
        let service = service(&backend);
        service.build_indexes().await.unwrap();
        assert_eq!(service.search("marie", &SearchOptions::default()).total, 1);

        backend
            .put("characters.csv", "id,unique_key,updated_at,name\n1,kokoro,2024-01-01,Kokoro\n")
            .await;
        service.loader().invalidate(ContentKind::Character);
        service.build_indexes().await.unwrap();

        assert_eq!(service.search("marie", &SearchOptions::default()).total, 0);
        assert_eq!(service.search("kokoro", &SearchOptions::default()).total, 1);
        assert_eq!(service.document_count(), 12);
    }
}
