use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use time::UtcDateTime;
use tracing::instrument;
use wiki_asyncutils::{Deduplicator, InFlight};
use wiki_cache::Cache;
use wiki_content::records::{Accessory, Character, Episode, Event, Gacha, Guide, Item, Mission, Quiz, Swimsuit, Tool};
use wiki_content::{Collection, ContentKind, Record, Rejected, SourceFormat, parse};
use wiki_storage::BackendHandle;
use wiki_storage::error::ErrorKind as StorageErrorKind;

use crate::error::{ErrorKind, LoadCause, Result};
use crate::{LoadReport, Sources};

/// Dedup key shared by concurrent [`ContentLoader::initialize()`] calls.
pub const INITIALIZE_KEY: &str = "content:initialize";

/// The content cache: one [`Collection`] per loaded type, keyed by
/// [`ContentKind::cache_key()`].
pub type ContentCache = Cache<Collection>;

type LoadOutcome = std::result::Result<(), ErrorKind>;

struct Inner {
    backend: BackendHandle,
    cache: Arc<ContentCache>,
    sources: Sources,
    loads: Deduplicator<LoadOutcome>,
    reports: RwLock<HashMap<ContentKind, LoadReport>>,
}

/// Loads, caches and serves every content type.
///
/// Cloning is cheap and every clone shares the same cache, in-flight loads
/// and reports. The loader is the only writer of its cache; everything else
/// reads.
///
/// Getters are synchronous and never trigger a load: before a type is
/// loaded they return an empty slice, and lookups return `None`.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wiki_cache::Cache;
/// use wiki_library::{ContentLoader, Sources};
/// use wiki_storage::backend::LocalBackend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = Arc::new(LocalBackend::new("local", "/srv/wiki/data")?);
/// let loader = ContentLoader::new(backend, Arc::new(Cache::new()), Sources::default());
/// loader.initialize().await?;
/// for event in loader.events().iter() {
///     println!("{}", event.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContentLoader {
    inner: Arc<Inner>,
}

impl ContentLoader {
    pub fn new(backend: BackendHandle, cache: Arc<ContentCache>, sources: Sources) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                cache,
                sources,
                loads: Deduplicator::new(),
                reports: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.inner.backend
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.inner.cache
    }

    pub fn sources(&self) -> &Sources {
        &self.inner.sources
    }

    /// Loads every content type that is not loaded yet.
    ///
    /// Idempotent: once everything is loaded this returns without I/O.
    /// Concurrent calls share one load sequence, and each type's load is
    /// shared with any concurrent [`load()`](Self::load) of that type.
    ///
    /// All types are attempted even when some fail. The first failure (in
    /// type order) is returned; the rest are logged. Types that did load
    /// stay loaded, so a retry after [`invalidate()`](Self::invalidate)
    /// only re-fetches what is missing.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        let this = self.clone();
        let outcome = self.inner.loads.dedupe(INITIALIZE_KEY, move || async move { this.load_all().await }).await;
        outcome.map_err(exn::Exn::from)
    }

    /// Loads a single content type, unless it is already loaded.
    pub async fn load(&self, kind: ContentKind) -> Result<()> {
        self.ensure(kind).await.map_err(exn::Exn::from)
    }

    async fn load_all(&self) -> LoadOutcome {
        let outcomes = join_all(ContentKind::ALL.map(|kind| self.ensure(kind))).await;
        let mut failures = outcomes.into_iter().filter_map(std::result::Result::err);
        let first = failures.next();
        for other in failures {
            tracing::warn!(error = %other, "additional content load failure");
        }
        match first {
            Some(failure) => Err(failure),
            None => {
                tracing::info!("content initialized");
                Ok(())
            },
        }
    }

    async fn ensure(&self, kind: ContentKind) -> LoadOutcome {
        if self.is_loaded(kind) {
            return Ok(());
        }
        self.shared_load(kind).await
    }

    fn shared_load(&self, kind: ContentKind) -> InFlight<LoadOutcome> {
        let this = self.clone();
        self.inner.loads.dedupe(kind.cache_key(), move || async move { this.fetch(kind).await })
    }

    #[instrument(skip(self), fields(backend = self.inner.backend.name()))]
    async fn fetch(&self, kind: ContentKind) -> LoadOutcome {
        match self.fetch_inner(kind).await {
            Ok(report) => {
                for rejected in &report.rejected {
                    tracing::warn!(
                        %kind,
                        position = rejected.position,
                        unique_key = rejected.unique_key.as_deref(),
                        reason = %rejected.reason,
                        "record rejected"
                    );
                }
                tracing::info!(
                    %kind,
                    records = report.records,
                    rejected = report.rejected.len(),
                    bytes = report.bytes,
                    "content loaded"
                );
                self.inner.reports.write().unwrap_or_else(PoisonError::into_inner).insert(kind, report);
                Ok(())
            },
            Err(cause) => {
                tracing::warn!(%kind, %cause, "content load failed");
                Err(ErrorKind::ContentLoad { kind, cause })
            },
        }
    }

    async fn fetch_inner(&self, kind: ContentKind) -> std::result::Result<LoadReport, LoadCause> {
        let source = self.inner.sources.get(kind);
        let format = SourceFormat::from_path(source)
            .ok_or_else(|| LoadCause::Document(format!("cannot infer the format of {}", source.display())))?;
        let bytes = self.inner.backend.read(source).await.map_err(|err| {
            tracing::debug!(error = ?err, "source read failed");
            match &*err {
                StorageErrorKind::NotFound(path) => LoadCause::NotFound(path.clone()),
                other => LoadCause::Storage(other.to_string()),
            }
        })?;
        let source_hash = blake3::hash(&bytes).to_string();
        let (collection, rejected) = parse_collection(kind, format, &bytes).map_err(|err| {
            tracing::debug!(error = ?err, "source parse failed");
            LoadCause::Document((*err).to_string())
        })?;
        let records = collection.len();
        // Publishing is a single cache write, so readers see either the
        // previous collection or the complete new one.
        self.inner.cache.set(kind.cache_key(), collection);
        Ok(LoadReport {
            kind,
            source: source.to_path_buf(),
            records,
            rejected,
            source_hash,
            bytes: bytes.len(),
            loaded_at: UtcDateTime::now(),
        })
    }

    /// Whether `kind` has a loaded collection.
    pub fn is_loaded(&self, kind: ContentKind) -> bool {
        self.inner.cache.has(&kind.cache_key())
    }

    /// Whether every content type is loaded.
    pub fn is_initialized(&self) -> bool {
        ContentKind::ALL.into_iter().all(|kind| self.is_loaded(kind))
    }

    /// Drops the loaded collection of `kind` so the next load fetches it
    /// again. Returns `true` if it was loaded.
    pub fn invalidate(&self, kind: ContentKind) -> bool {
        self.inner.reports.write().unwrap_or_else(PoisonError::into_inner).remove(&kind);
        self.inner.cache.invalidate(&kind.cache_key())
    }

    pub fn invalidate_all(&self) {
        for kind in ContentKind::ALL {
            self.invalidate(kind);
        }
    }

    /// Report of the last successful load of `kind`, if it is loaded.
    pub fn report(&self, kind: ContentKind) -> Option<LoadReport> {
        self.inner.reports.read().unwrap_or_else(PoisonError::into_inner).get(&kind).cloned()
    }

    /// Reports of every loaded type, in type order.
    pub fn reports(&self) -> Vec<LoadReport> {
        ContentKind::ALL.into_iter().filter_map(|kind| self.report(kind)).collect()
    }

    /// The loaded collection of `kind`, type-erased.
    pub fn collection_of(&self, kind: ContentKind) -> Option<Collection> {
        self.inner.cache.get(&kind.cache_key())
    }

    /// The loaded records of type `T`, empty if not loaded.
    pub fn collection<T: Record>(&self) -> Arc<[T]> {
        self.collection_of(T::KIND)
            .and_then(|collection| collection.downcast::<T>())
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Finds a record of type `T` by unique key.
    ///
    /// A linear scan; at current dataset sizes (hundreds of records per
    /// type) that is cheaper than keeping a second index in sync.
    pub fn find<T: Record>(&self, unique_key: &str) -> Option<T> {
        self.collection::<T>().iter().find(|record| record.unique_key() == unique_key).cloned()
    }
}

fn parse_collection(
    kind: ContentKind,
    format: SourceFormat,
    bytes: &[u8],
) -> wiki_content::error::Result<(Collection, Vec<Rejected>)> {
    fn typed<T: Record>(format: SourceFormat, bytes: &[u8]) -> wiki_content::error::Result<(Collection, Vec<Rejected>)> {
        let parsed = parse::<T>(format, bytes)?;
        Ok((Collection::new(parsed.records), parsed.rejected))
    }
    match kind {
        ContentKind::Character => typed::<Character>(format, bytes),
        ContentKind::Event => typed::<Event>(format, bytes),
        ContentKind::Swimsuit => typed::<Swimsuit>(format, bytes),
        ContentKind::Item => typed::<Item>(format, bytes),
        ContentKind::Guide => typed::<Guide>(format, bytes),
        ContentKind::Gacha => typed::<Gacha>(format, bytes),
        ContentKind::Episode => typed::<Episode>(format, bytes),
        ContentKind::Tool => typed::<Tool>(format, bytes),
        ContentKind::Accessory => typed::<Accessory>(format, bytes),
        ContentKind::Mission => typed::<Mission>(format, bytes),
        ContentKind::Quiz => typed::<Quiz>(format, bytes),
    }
}

/// Generates the named per-type getters and lookups.
macro_rules! typed_accessors {
    ($($record:ident => $getter:ident, $lookup:ident;)*) => {
        impl ContentLoader {
            $(
                #[doc = concat!("Loaded [`", stringify!($record), "`] records, empty if not loaded.")]
                pub fn $getter(&self) -> Arc<[$record]> {
                    self.collection::<$record>()
                }

                #[doc = concat!("Finds a [`", stringify!($record), "`] by unique key.")]
                pub fn $lookup(&self, unique_key: &str) -> Option<$record> {
                    self.find::<$record>(unique_key)
                }
            )*
        }
    };
}

typed_accessors! {
    Character => characters, character_by_unique_key;
    Event => events, event_by_unique_key;
    Swimsuit => swimsuits, swimsuit_by_unique_key;
    Item => items, item_by_unique_key;
    Guide => guides, guide_by_unique_key;
    Gacha => gachas, gacha_by_unique_key;
    Episode => episodes, episode_by_unique_key;
    Tool => tools, tool_by_unique_key;
    Accessory => accessories, accessory_by_unique_key;
    Mission => missions, mission_by_unique_key;
    Quiz => quizzes, quiz_by_unique_key;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;
    use wiki_content::error::ErrorKind as ContentErrorKind;
    use wiki_storage::backend::MockBackend;

    fn events_json(count: usize) -> String {
        let events: Vec<String> = (1..=count)
            .map(|n| {
                format!(
                    r#"{{"id": "{n}", "unique_key": "event-{n}", "updated_at": "2024-01-{n:02}", "name": "Event {n}", "type": "Event", "event_status": "Ended"}}"#
                )
            })
            .collect();
        format!("[{}]", events.join(","))
    }

    fn fixtures() -> Arc<MockBackend> {
        Arc::new(MockBackend::with_files([
            ("characters.csv", "id,unique_key,updated_at,name\n1,kasumi,2024-01-01,Kasumi\n".to_string()),
            ("events.json", events_json(12)),
            (
                "swimsuits.csv",
                "id,unique_key,updated_at,name,character,rarity\n1,mist,2024-01-01,Mist,kasumi,SSR\n".to_string(),
            ),
            (
                "items.csv",
                "id,unique_key,updated_at,name,category,rarity\n\
                 1,gem,2024-01-01,Gem,Currency,SSR\n\
                 2,,2024-01-01,Keyless,Material,R\n\
                 3,coin,2024-01-01,Coin,Currency,N\n"
                    .to_string(),
            ),
            (
                "guides.json",
                r#"[{"id": "1", "unique_key": "start", "updated_at": "2024-01-01", "title": "Getting Started", "category": "Basics"}]"#
                    .to_string(),
            ),
            (
                "gachas.json",
                r#"[{"id": "1", "unique_key": "summer", "updated_at": "2024-01-01", "name": "Summer Gacha", "gacha_status": "Active"}]"#
                    .to_string(),
            ),
            ("episodes.csv", "id,unique_key,updated_at,title,type\n1,ep1,2024-01-01,Arrival,Main\n".to_string()),
            (
                "tools.json",
                r#"[{"id": "1", "unique_key": "calc", "updated_at": "2024-01-01", "name": "Calculator", "category": "Utility"}]"#
                    .to_string(),
            ),
            (
                "accessories.csv",
                "id,unique_key,updated_at,name,rarity,slot\n1,ribbon,2024-01-01,Ribbon,SR,Head\n".to_string(),
            ),
            ("missions.csv", "id,unique_key,updated_at,name,type\n1,login,2024-01-01,Daily Login,Daily\n".to_string()),
            (
                "quizzes.json",
                r#"[{"id": "1", "unique_key": "lore", "updated_at": "2024-01-01", "title": "Lore Quiz", "category": "Lore", "difficulty": "Easy"}]"#
                    .to_string(),
            ),
        ]))
    }

    fn loader(backend: &Arc<MockBackend>) -> ContentLoader {
        ContentLoader::new(backend.clone(), Arc::new(Cache::new()), Sources::default())
    }

    #[test]
    fn test_getters_before_load() {
        let loader = loader(&fixtures());
        assert!(loader.events().is_empty());
        assert!(loader.event_by_unique_key("event-1").is_none());
        assert!(!loader.is_initialized());
        assert!(loader.report(ContentKind::Event).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_initialize_fetches_each_source_once() {
        let backend = fixtures();
        let first = loader(&backend);
        let second = first.clone();

        let (a, b) = tokio::join!(first.initialize(), second.initialize());
        a.unwrap();
        b.unwrap();

        assert_eq!(backend.read_count("events.json"), 1);
        assert_eq!(backend.total_reads(), ContentKind::ALL.len());
        let (events_a, events_b) = (first.events(), second.events());
        assert_eq!(events_a.len(), 12);
        assert!(Arc::ptr_eq(&events_a, &events_b));
        assert!(first.is_initialized());
        assert!(first.inner.loads.pending().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let backend = fixtures();
        let loader = loader(&backend);
        loader.initialize().await.unwrap();
        let events = loader.events();
        loader.initialize().await.unwrap();
        assert_eq!(backend.total_reads(), ContentKind::ALL.len());
        assert!(Arc::ptr_eq(&events, &loader.events()));
    }

    #[tokio::test]
    async fn test_load_joins_initialize() {
        let backend = fixtures();
        let loader = loader(&backend);
        let (single, all) = tokio::join!(loader.load(ContentKind::Event), loader.initialize());
        single.unwrap();
        all.unwrap();
        assert_eq!(backend.read_count("events.json"), 1);
    }

    #[tokio::test]
    async fn test_row_missing_unique_key_is_dropped() {
        let loader = loader(&fixtures());
        loader.initialize().await.unwrap();

        let keys: Vec<String> = loader.items().iter().map(|item| item.meta.unique_key.clone()).collect();
        assert_eq!(keys, vec!["gem", "coin"]);

        let report = loader.report(ContentKind::Item).unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.source, Path::new("items.csv"));
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].position, 2);
        assert_eq!(report.rejected[0].reason, ContentErrorKind::MissingField("unique_key"));
    }

    #[tokio::test]
    async fn test_lookups() {
        let loader = loader(&fixtures());
        loader.initialize().await.unwrap();
        assert_eq!(loader.event_by_unique_key("event-3").unwrap().meta.id, "3");
        assert!(loader.event_by_unique_key("event-13").is_none());
        assert_eq!(loader.character_by_unique_key("kasumi").unwrap().name.en(), "Kasumi");
        assert_eq!(loader.quiz_by_unique_key("lore").unwrap().title.en(), "Lore Quiz");
        assert!(loader.accessory_by_unique_key("kasumi").is_none());
    }

    #[tokio::test]
    async fn test_failed_load_is_retryable() {
        let backend = fixtures();
        let loader = loader(&backend);
        backend.fail_reads("gachas.json");

        let err = loader.initialize().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ContentLoad { kind: ContentKind::Gacha, cause: LoadCause::Storage(_) }));
        assert!(err.is_retryable());
        // Everything else still loaded.
        assert!(loader.is_loaded(ContentKind::Event));
        assert!(!loader.is_initialized());
        assert!(loader.gachas().is_empty());

        backend.restore("gachas.json");
        loader.invalidate(ContentKind::Gacha);
        loader.initialize().await.unwrap();
        assert_eq!(loader.gachas().len(), 1);
        assert_eq!(backend.read_count("gachas.json"), 2);
        assert_eq!(backend.read_count("events.json"), 1);
    }

    #[tokio::test]
    async fn test_first_failure_in_type_order_is_returned() {
        let backend = fixtures();
        let loader = loader(&backend);
        backend.fail_reads("quizzes.json");
        backend.remove("swimsuits.csv").await;

        let err = loader.initialize().await.unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::ContentLoad {
                kind: ContentKind::Swimsuit,
                cause: LoadCause::NotFound("swimsuits.csv".into()),
            }
        );
        assert!(!err.is_retryable());
        assert!(!loader.is_loaded(ContentKind::Quiz));
    }

    #[rstest]
    #[case("{}")]
    #[case("[{\"id\": ")]
    #[case("[\"not a record\"]")]
    #[tokio::test]
    async fn test_unreadable_document(#[case] contents: &str) {
        let backend = fixtures();
        backend.put("events.json", contents).await;
        let loader = loader(&backend);
        let err = loader.load(ContentKind::Event).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ContentLoad { kind: ContentKind::Event, cause: LoadCause::Document(_) }));
        assert!(!loader.is_loaded(ContentKind::Event));
    }

    #[tokio::test]
    async fn test_unknown_source_format() {
        let backend = fixtures();
        let sources = Sources::default().with(ContentKind::Tool, "tools.yaml");
        let loader = ContentLoader::new(backend.clone(), Arc::new(Cache::new()), sources);
        let err = loader.load(ContentKind::Tool).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ContentLoad { cause: LoadCause::Document(_), .. }));
        assert_eq!(backend.total_reads(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_refetches_changed_source() {
        let backend = fixtures();
        let loader = loader(&backend);
        loader.initialize().await.unwrap();
        let before = loader.report(ContentKind::Event).unwrap();

        backend.put("events.json", events_json(3)).await;
        // Still serving the cached collection.
        loader.load(ContentKind::Event).await.unwrap();
        assert_eq!(loader.events().len(), 12);

        assert!(loader.invalidate(ContentKind::Event));
        assert!(loader.report(ContentKind::Event).is_none());
        assert!(!loader.invalidate(ContentKind::Event));
        loader.initialize().await.unwrap();
        assert_eq!(loader.events().len(), 3);
        let after = loader.report(ContentKind::Event).unwrap();
        assert_ne!(before.source_hash, after.source_hash);
        assert_eq!(backend.read_count("events.json"), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let backend = fixtures();
        let loader = loader(&backend);
        loader.initialize().await.unwrap();
        loader.invalidate_all();
        assert!(loader.cache().is_empty());
        assert!(loader.reports().is_empty());
        loader.initialize().await.unwrap();
        assert_eq!(backend.total_reads(), 2 * ContentKind::ALL.len());
        assert_eq!(loader.reports().len(), ContentKind::ALL.len());
    }

    #[tokio::test]
    async fn test_shared_cache() {
        let backend = fixtures();
        let cache = Arc::new(Cache::new());
        let loader = ContentLoader::new(backend, Arc::clone(&cache), Sources::default());
        loader.load(ContentKind::Character).await.unwrap();
        assert_eq!(cache.keys(), vec!["content:characters".to_string()]);
        assert_eq!(cache.get("content:characters").map(|c| c.kind()), Some(ContentKind::Character));
    }
}
