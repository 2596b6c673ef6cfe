use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use wiki_content::ContentKind;

/// Source path of every content type.
///
/// Starts from each type's default file name. Overrides replace individual
/// entries, so every type always has exactly one source.
///
/// ```
/// use std::path::Path;
/// use wiki_content::ContentKind;
/// use wiki_library::Sources;
///
/// let sources = Sources::default().with(ContentKind::Event, "2024/events.json");
/// assert_eq!(sources.get(ContentKind::Event), Path::new("2024/events.json"));
/// assert_eq!(sources.get(ContentKind::Item), Path::new("items.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    paths: BTreeMap<ContentKind, PathBuf>,
}
impl Default for Sources {
    fn default() -> Self {
        let paths = ContentKind::ALL.into_iter().map(|kind| (kind, PathBuf::from(kind.default_source()))).collect();
        Self { paths }
    }
}
impl Sources {
    pub fn with(mut self, kind: ContentKind, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(kind, path.into());
        self
    }

    pub fn get(&self, kind: ContentKind) -> &Path {
        // Every kind is inserted by `default()` and never removed.
        self.paths.get(&kind).map(PathBuf::as_path).unwrap_or_else(|| Path::new(kind.default_source()))
    }

    /// Every type with its source, in canonical type order.
    pub fn iter(&self) -> impl Iterator<Item = (ContentKind, &Path)> {
        self.paths.iter().map(|(kind, path)| (*kind, path.as_path()))
    }
}
impl<P: Into<PathBuf>> FromIterator<(ContentKind, P)> for Sources {
    /// Defaults, with the given overrides applied.
    fn from_iter<I: IntoIterator<Item = (ContentKind, P)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |sources, (kind, path)| sources.with(kind, path))
    }
}
