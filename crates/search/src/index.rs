//! Inverted indexes, one per content type and language.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use wiki_content::models::{Language, LocalizedString, get_localized_value};
use wiki_content::{Collection, Content, ContentKind};

use crate::tokenizer::{normalize, tokenize};

/// The searchable snapshot of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub kind: ContentKind,
    pub id: String,
    pub unique_key: String,
    pub title: LocalizedString,
    pub summaries: Vec<LocalizedString>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
}
impl Document {
    pub fn from_content(content: &dyn Content) -> Self {
        Self {
            kind: content.kind(),
            id: content.meta().id.clone(),
            unique_key: content.unique_key().to_string(),
            title: content.title().clone(),
            summaries: content.summaries().into_iter().cloned().collect(),
            keywords: content.keywords().into_iter().map(str::to_string).collect(),
            tags: content.tags().to_vec(),
        }
    }

    /// Every token the document is findable by in `language`.
    fn tokens(&self, language: Language) -> HashSet<String> {
        let localized = std::iter::once(&self.title).chain(&self.summaries);
        localized
            .map(|text| get_localized_value(text, language))
            .chain(self.keywords.iter().map(String::as_str))
            .chain(self.tags.iter().map(String::as_str))
            .flat_map(tokenize)
            .collect()
    }
}

/// How a document matched a query, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchKind {
    /// The title equals the query.
    Exact,
    /// The title starts with the query.
    Prefix,
    /// The title contains the query.
    Substring,
    /// A query token equals one of the tags' tokens.
    Tag,
    /// A query token appears somewhere else in the document.
    Token,
}
impl MatchKind {
    /// Score before the per-token bonus.
    pub fn base_score(self) -> u32 {
        match self {
            MatchKind::Exact => 100,
            MatchKind::Prefix => 75,
            MatchKind::Substring => 50,
            MatchKind::Tag => 25,
            MatchKind::Token => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
            MatchKind::Substring => "substring",
            MatchKind::Tag => "tag",
            MatchKind::Token => "token",
        }
    }
}
impl Display for MatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

struct LanguageIndex {
    /// Token to document positions, ascending.
    postings: HashMap<String, Vec<usize>>,
    /// Normalized title per document position.
    titles: Vec<String>,
}

/// Index of one content type.
pub(crate) struct KindIndex {
    documents: Vec<Arc<Document>>,
    tag_tokens: Vec<HashSet<String>>,
    languages: BTreeMap<Language, LanguageIndex>,
}
impl KindIndex {
    pub(crate) fn build(collection: &Collection, languages: &[Language]) -> Self {
        let documents: Vec<Arc<Document>> =
            collection.iter().map(|content| Arc::new(Document::from_content(content))).collect();
        let tag_tokens = documents
            .iter()
            .map(|document| document.tags.iter().flat_map(|tag| tokenize(tag)).collect())
            .collect();
        let languages = languages
            .iter()
            .map(|&language| {
                let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
                let mut titles = Vec::with_capacity(documents.len());
                for (position, document) in documents.iter().enumerate() {
                    titles.push(normalize(get_localized_value(&document.title, language)));
                    for token in document.tokens(language) {
                        postings.entry(token).or_default().push(position);
                    }
                }
                (language, LanguageIndex { postings, titles })
            })
            .collect();
        Self { documents, tag_tokens, languages }
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    pub(crate) fn document(&self, position: usize) -> &Arc<Document> {
        &self.documents[position]
    }

    /// Positions of the documents sharing at least one token with the query,
    /// with the number of distinct query tokens each one matched.
    ///
    /// `tokens` must already be distinct.
    pub(crate) fn candidates(&self, language: Language, tokens: &[String]) -> BTreeMap<usize, u32> {
        let mut matched = BTreeMap::new();
        let Some(index) = self.languages.get(&language) else {
            return matched;
        };
        for token in tokens {
            for &position in index.postings.get(token).into_iter().flatten() {
                *matched.entry(position).or_insert(0) += 1;
            }
        }
        matched
    }

    /// Classifies a candidate against the normalized query.
    pub(crate) fn classify(&self, language: Language, position: usize, query: &str, tokens: &[String]) -> MatchKind {
        let title = self.languages.get(&language).map(|index| index.titles[position].as_str()).unwrap_or_default();
        if !query.is_empty() && title == query {
            MatchKind::Exact
        } else if !query.is_empty() && title.starts_with(query) {
            MatchKind::Prefix
        } else if !query.is_empty() && title.contains(query) {
            MatchKind::Substring
        } else if tokens.iter().any(|token| self.tag_tokens[position].contains(token)) {
            MatchKind::Tag
        } else {
            MatchKind::Token
        }
    }
}

/// A complete, immutable set of indexes. Rebuilding produces a new set.
pub(crate) struct IndexSet {
    kinds: BTreeMap<ContentKind, KindIndex>,
    languages: Vec<Language>,
}
impl IndexSet {
    pub(crate) fn build(collections: impl IntoIterator<Item = Collection>, languages: &[Language]) -> Self {
        let kinds = collections
            .into_iter()
            .map(|collection| (collection.kind(), KindIndex::build(&collection, languages)))
            .collect();
        Self { kinds, languages: languages.to_vec() }
    }

    /// `language` if it was indexed, English otherwise.
    pub(crate) fn resolve_language(&self, language: Language) -> Language {
        if self.languages.contains(&language) { language } else { Language::En }
    }

    /// Indexes in type order, restricted to `types` unless it is empty.
    pub(crate) fn kinds<'a>(&'a self, types: &'a [ContentKind]) -> impl Iterator<Item = (ContentKind, &'a KindIndex)> {
        self.kinds
            .iter()
            .filter(move |(kind, _)| types.is_empty() || types.contains(kind))
            .map(|(kind, index)| (*kind, index))
    }

    pub(crate) fn document_count(&self) -> usize {
        self.kinds.values().map(KindIndex::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiki_content::records::Tool;
    use wiki_content::{Record, Row};

    fn tool(key: &str, name: &str, name_jp: Option<&str>, tags: &[&str]) -> Tool {
        let mut fields = serde_json::Map::new();
        fields.insert("id".into(), key.into());
        fields.insert("unique_key".into(), key.into());
        fields.insert("updated_at".into(), "2024-01-01".into());
        fields.insert("name".into(), name.into());
        if let Some(jp) = name_jp {
            fields.insert("name_jp".into(), jp.into());
        }
        fields.insert("category".into(), "Utility".into());
        fields.insert("tags".into(), tags.iter().map(|t| serde_json::Value::from(*t)).collect());
        Tool::from_row(&Row::new(1, fields)).unwrap()
    }

    fn index() -> KindIndex {
        let tools = vec![
            tool("calc", "Stat Calculator", Some("ステータス計算機"), &["stats"]),
            tool("planner", "Calculator Planner", None, &[]),
            tool("tracker", "Event Tracker", None, &["calculator-free"]),
        ];
        KindIndex::build(&Collection::new(tools), &[Language::En, Language::Jp])
    }

    fn tokens(query: &str) -> Vec<String> {
        tokenize(query)
    }

    #[test]
    fn test_candidates_count_distinct_tokens() {
        let index = index();
        let found = index.candidates(Language::En, &tokens("stat calculator"));
        assert_eq!(found, BTreeMap::from([(0, 2), (1, 1), (2, 1)]));
        assert!(index.candidates(Language::Kr, &tokens("stat")).is_empty());
    }

    #[test]
    fn test_localized_tokens_fall_back_to_english() {
        let index = index();
        // "planner" has no Japanese title, so its English one is indexed.
        assert_eq!(index.candidates(Language::Jp, &tokens("planner")), BTreeMap::from([(1, 1)]));
        assert_eq!(index.candidates(Language::Jp, &tokens("ステータス計算機")), BTreeMap::from([(0, 1)]));
        assert!(index.candidates(Language::En, &tokens("ステータス計算機")).is_empty());
    }

    #[rstest]
    #[case("Stat Calculator", 0, MatchKind::Exact)]
    #[case("stat", 0, MatchKind::Prefix)]
    #[case("calculator", 0, MatchKind::Substring)]
    #[case("calculator", 1, MatchKind::Prefix)]
    #[case("calculator", 2, MatchKind::Tag)]
    #[case("utility", 2, MatchKind::Token)]
    fn test_classify(#[case] query: &str, #[case] position: usize, #[case] expected: MatchKind) {
        let index = index();
        assert_eq!(index.classify(Language::En, position, &normalize(query), &tokens(query)), expected);
    }

    #[test]
    fn test_match_kind_ranking() {
        let mut kinds = vec![MatchKind::Token, MatchKind::Exact, MatchKind::Tag, MatchKind::Substring, MatchKind::Prefix];
        kinds.sort();
        let scores: Vec<u32> = kinds.into_iter().map(MatchKind::base_score).collect();
        assert_eq!(scores, vec![100, 75, 50, 25, 10]);
    }

    #[test]
    fn test_index_set_language_fallback() {
        let set = IndexSet::build([Collection::new(Vec::<Tool>::new())], &[Language::En, Language::Jp]);
        assert_eq!(set.resolve_language(Language::Jp), Language::Jp);
        assert_eq!(set.resolve_language(Language::Kr), Language::En);
        assert_eq!(set.document_count(), 0);
        assert_eq!(set.kinds(&[]).count(), 1);
        assert_eq!(set.kinds(&[ContentKind::Quiz]).count(), 0);
    }
}
