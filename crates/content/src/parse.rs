//! Whole-source parsing: bytes in, typed records plus rejections out.

use exn::ResultExt;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::{Record, Row};

/// Encoding of a dataset source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Json,
}
impl SourceFormat {
    /// Infers the format from a path's extension (case-insensitive).
    ///
    /// ```
    /// use wiki_content::SourceFormat;
    /// assert_eq!(SourceFormat::from_path("data/items.CSV"), Some(SourceFormat::Csv));
    /// assert_eq!(SourceFormat::from_path("events.json"), Some(SourceFormat::Json));
    /// assert_eq!(SourceFormat::from_path("events.yaml"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
        }
    }
}
impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A row that was dropped while parsing, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// 1-based index among the data rows of the source.
    pub position: usize,
    /// The row's unique key, if it had a readable one.
    pub unique_key: Option<String>,
    pub reason: ErrorKind,
}
impl Display for Rejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.unique_key {
            Some(key) => write!(f, "row {} ({key}): {}", self.position, self.reason),
            None => write!(f, "row {}: {}", self.position, self.reason),
        }
    }
}

/// Result of parsing one source.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    /// Valid records, in source order.
    pub records: Vec<T>,
    /// Dropped rows, in source order.
    pub rejected: Vec<Rejected>,
}

/// Parses a whole source into typed records.
///
/// Only document-level problems are errors: bytes that are not UTF-8, a CSV
/// header that can't be read, or JSON that is not an array of objects.
/// Individual rows that fail validation, including a second row reusing a
/// unique key, are dropped and reported in [`Parsed::rejected`].
#[instrument(skip(bytes), fields(kind = %T::KIND, bytes = bytes.len()))]
pub fn parse<T: Record>(format: SourceFormat, bytes: &[u8]) -> Result<Parsed<T>> {
    let rows = match format {
        SourceFormat::Csv => csv_rows(bytes)?,
        SourceFormat::Json => json_rows(bytes)?,
    };
    let mut parsed = Parsed { records: Vec::with_capacity(rows.len()), rejected: Vec::new() };
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let rejected = match T::from_row(&row) {
            Ok(record) if seen.insert(record.unique_key().to_string()) => {
                parsed.records.push(record);
                continue;
            },
            Ok(record) => Rejected {
                position: row.position(),
                unique_key: Some(record.unique_key().to_string()),
                reason: ErrorKind::DuplicateKey(record.unique_key().to_string()),
            },
            Err(err) => Rejected {
                position: row.position(),
                unique_key: row.text("unique_key").ok().flatten(),
                reason: (*err).clone(),
            },
        };
        tracing::debug!(position = rejected.position, reason = %rejected.reason, "row rejected");
        parsed.rejected.push(rejected);
    }
    Ok(parsed)
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes).or_raise(|| ErrorKind::InvalidDocument("source is not UTF-8".to_string()))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn csv_rows(bytes: &[u8]) -> Result<Vec<Row>> {
    let text = utf8(bytes)?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .or_raise(|| ErrorKind::InvalidDocument("unreadable CSV header".to_string()))?
        .clone();
    if headers.iter().all(str::is_empty) {
        exn::bail!(ErrorKind::InvalidDocument("CSV header is empty".to_string()));
    }
    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.or_raise(|| ErrorKind::InvalidDocument(format!("unreadable CSV record {}", index + 1)))?;
        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(Row::new(index + 1, fields));
    }
    Ok(rows)
}

fn json_rows(bytes: &[u8]) -> Result<Vec<Row>> {
    let text = utf8(bytes)?;
    let document: Value =
        serde_json::from_str(text).or_raise(|| ErrorKind::InvalidDocument("malformed JSON".to_string()))?;
    let Value::Array(items) = document else {
        exn::bail!(ErrorKind::InvalidDocument("expected a JSON array of records".to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(Row::new(index + 1, fields)),
            other => Err(exn::Exn::from(ErrorKind::InvalidDocument(format!(
                "record {} is not an object: {other}",
                index + 1
            )))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, Language, Rarity};
    use crate::records::{Event, Item, Quiz};
    use rstest::rstest;

    const ITEMS: &str = "\
id,unique_key,updated_at,name,name_jp,category,rarity,sources,tags
1,gem,2024-01-01,Gem,ジェム,Currency,SSR,\"Login, Events\",premium
2,,2024-01-01,Nameless Key,,Material,R,,
3,coin,2024-01-01,Coin,,Currency,N,Shop,
4,gem,2024-01-02,Gem Again,,Currency,SSR,,
5,bad-rarity,2024-01-01,Mystery,,Gift,UR,,
";

    #[test]
    fn test_csv_rows_are_validated_independently() {
        let parsed = parse::<Item>(SourceFormat::Csv, ITEMS.as_bytes()).unwrap();
        let keys: Vec<_> = parsed.records.iter().map(|item| item.meta.unique_key.as_str()).collect();
        assert_eq!(keys, vec!["gem", "coin"]);

        let gem = &parsed.records[0];
        assert_eq!(gem.category, ItemCategory::Currency);
        assert_eq!(gem.rarity, Rarity::Ssr);
        assert_eq!(gem.name.get(Language::Jp), "ジェム");
        assert_eq!(gem.sources, vec!["Login", "Events"]);

        assert_eq!(
            parsed.rejected,
            vec![
                Rejected { position: 2, unique_key: None, reason: ErrorKind::MissingField("unique_key") },
                Rejected {
                    position: 4,
                    unique_key: Some("gem".to_string()),
                    reason: ErrorKind::DuplicateKey("gem".to_string()),
                },
                Rejected {
                    position: 5,
                    unique_key: Some("bad-rarity".to_string()),
                    reason: ErrorKind::ParseError { field: "rarity", value: "UR".to_string() },
                },
            ]
        );
    }

    #[test]
    fn test_csv_short_rows_and_bom() {
        let csv = "\u{feff}id,unique_key,updated_at,title,category,difficulty,time_limit\n1,q1,2024-03-03,Trivia,Lore,Easy\n";
        let parsed = parse::<Quiz>(SourceFormat::Csv, csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].time_limit, None);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_json_array() {
        let json = r#"[
            {"id": 1, "unique_key": "a", "updated_at": "2024-01-01", "name": "A", "type": "Main", "event_status": "Ended"},
            {"id": 2, "unique_key": "b", "updated_at": "2024-01-01", "name": {"jp": "ビー"}, "type": "Main", "event_status": "Ended"}
        ]"#;
        let parsed = parse::<Event>(SourceFormat::Json, json.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.rejected[0].reason, ErrorKind::MissingField("name"));
        assert_eq!(parsed.rejected[0].to_string(), "row 2 (b): missing required field: name");
    }

    #[rstest]
    #[case(SourceFormat::Json, b"{\"id\": 1}".as_slice())]
    #[case(SourceFormat::Json, b"[1, 2]".as_slice())]
    #[case(SourceFormat::Json, b"[{\"id\": ".as_slice())]
    #[case(SourceFormat::Json, b"\xff\xfe[]".as_slice())]
    #[case(SourceFormat::Csv, b"\xffid,unique_key\n".as_slice())]
    #[case(SourceFormat::Csv, b"".as_slice())]
    fn test_document_errors(#[case] format: SourceFormat, #[case] bytes: &[u8]) {
        let err = parse::<Event>(format, bytes).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidDocument(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_empty_sources() {
        assert!(parse::<Event>(SourceFormat::Json, b"[]").unwrap().records.is_empty());
        let parsed = parse::<Item>(SourceFormat::Csv, b"id,unique_key,updated_at\n").unwrap();
        assert!(parsed.records.is_empty());
        assert!(parsed.rejected.is_empty());
    }
}
