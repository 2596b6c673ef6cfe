use std::path::PathBuf;
use time::UtcDateTime;
use wiki_content::{ContentKind, Rejected};

/// Summary of the last successful load of one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub kind: ContentKind,
    pub source: PathBuf,
    /// Number of records kept.
    pub records: usize,
    /// Rows dropped during validation.
    pub rejected: Vec<Rejected>,
    /// BLAKE3 hash of the raw source bytes.
    pub source_hash: String,
    pub bytes: usize,
    pub loaded_at: UtcDateTime,
}
