//! Untyped source rows and the coercions that turn cells into fields.
//!
//! CSV and JSON sources both end up as a [`Row`]: a map from column (or
//! property) name to a JSON value. CSV cells are always strings, so every
//! accessor accepts the string spelling of its type as well as the native
//! JSON one.

use exn::ResultExt;
use serde_json::{Map, Value};
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::{ErrorKind, Result};
use crate::models::{Language, LocalizedString, RecordMeta, is_valid_unique_key};

/// One source record before typing.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    position: usize,
    fields: Map<String, Value>,
}
impl Row {
    /// `position` is the 1-based index of the record among the data rows of
    /// its source (the CSV header is not counted).
    pub fn new(position: usize, fields: Map<String, Value>) -> Self {
        Self { position, fields }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The value of `field`, with blank strings and `null` treated as absent.
    pub fn value(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            value => Some(value),
        }
    }

    /// A scalar field as trimmed text.
    pub fn text(&self, field: &'static str) -> Result<Option<String>> {
        Ok(match self.value(field) {
            None => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => exn::bail!(ErrorKind::ParseError {
                field,
                value: other.to_string(),
            }),
        })
    }

    pub fn required_text(&self, field: &'static str) -> Result<String> {
        self.text(field)?.ok_or_else(|| exn::Exn::from(ErrorKind::MissingField(field)))
    }

    /// A field parsed through its [`FromStr`] implementation.
    pub fn parse<T: FromStr>(&self, field: &'static str) -> Result<Option<T>> {
        let Some(text) = self.text(field)? else {
            return Ok(None);
        };
        match text.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => exn::bail!(ErrorKind::ParseError { field, value: text }),
        }
    }

    pub fn required<T: FromStr>(&self, field: &'static str) -> Result<T> {
        self.parse(field)?.ok_or_else(|| exn::Exn::from(ErrorKind::MissingField(field)))
    }

    /// An unsigned integer, from a JSON number or a numeric string.
    pub fn number(&self, field: &'static str) -> Result<Option<u32>> {
        self.parse(field)
    }

    /// A calendar date: `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to
    /// its date (in the timestamp's own offset).
    pub fn date(&self, field: &'static str) -> Result<Option<Date>> {
        let Some(text) = self.text(field)? else {
            return Ok(None);
        };
        if let Some(date) = parse_date(&text) {
            return Ok(Some(date));
        }
        exn::bail!(ErrorKind::ParseError { field, value: text })
    }

    pub fn required_date(&self, field: &'static str) -> Result<Date> {
        self.date(field)?.ok_or_else(|| exn::Exn::from(ErrorKind::MissingField(field)))
    }

    /// A boolean flag. Missing means `false`.
    pub fn flag(&self, field: &'static str) -> Result<bool> {
        let Some(value) = self.value(field) else {
            return Ok(false);
        };
        if let Value::Bool(b) = value {
            return Ok(*b);
        }
        let text = self.text(field)?.unwrap_or_default();
        match parse_bool(&text) {
            Some(b) => Ok(b),
            None => exn::bail!(ErrorKind::ParseError { field, value: text }),
        }
    }

    /// A list of strings: a JSON array, or in a text cell either a JSON array
    /// literal or a comma-separated list. Blank entries are dropped.
    pub fn list(&self, field: &'static str) -> Result<Vec<String>> {
        let items = match self.value(field) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(s)) if s.trim_start().starts_with('[') => {
                serde_json::from_str::<Vec<Value>>(s).or_raise(|| ErrorKind::ParseError {
                    field,
                    value: s.clone(),
                })?
            },
            Some(Value::String(s)) => s.split(',').map(|part| Value::String(part.to_string())).collect(),
            Some(other) => exn::bail!(ErrorKind::ParseError {
                field,
                value: other.to_string(),
            }),
        };
        let mut list = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Null => {},
                Value::String(s) if s.trim().is_empty() => {},
                Value::String(s) => list.push(s.trim().to_string()),
                Value::Number(n) => list.push(n.to_string()),
                other => exn::bail!(ErrorKind::ParseError {
                    field,
                    value: other.to_string(),
                }),
            }
        }
        Ok(list)
    }

    /// A localized text field.
    ///
    /// The base column may hold a plain string (English) or an object keyed
    /// by language code. Columns named `<field>_<lang>` add or replace
    /// translations. Returns `None` when no language has text, and a
    /// [`MissingField`](ErrorKind::MissingField) error when translations
    /// exist but English does not.
    pub fn localized(&self, field: &'static str) -> Result<Option<LocalizedString>> {
        let mut texts: Vec<(Language, String)> = Vec::new();
        match self.value(field) {
            None => {},
            Some(Value::String(s)) => texts.push((Language::En, s.trim().to_string())),
            Some(Value::Object(map)) => {
                for (code, value) in map {
                    // Unknown language codes in hand-written JSON are skipped.
                    let Ok(language) = code.parse::<Language>() else {
                        continue;
                    };
                    match value {
                        Value::String(s) => texts.push((language, s.trim().to_string())),
                        Value::Null => {},
                        other => exn::bail!(ErrorKind::ParseError {
                            field,
                            value: other.to_string(),
                        }),
                    }
                }
            },
            Some(other) => exn::bail!(ErrorKind::ParseError {
                field,
                value: other.to_string(),
            }),
        }
        for language in Language::ALL {
            let column = format!("{field}_{}", language.as_str());
            match self.value(&column) {
                Some(Value::String(s)) => texts.push((language, s.trim().to_string())),
                Some(other) => exn::bail!(ErrorKind::ParseError {
                    field,
                    value: other.to_string(),
                }),
                None => {},
            }
        }
        texts.retain(|(_, text)| !text.is_empty());
        if texts.is_empty() {
            return Ok(None);
        }
        // Later entries win, so suffixed columns override the base column.
        let en = texts.iter().rev().find(|(language, _)| *language == Language::En).map(|(_, text)| text.clone());
        let mut localized = en
            .and_then(LocalizedString::new)
            .ok_or_else(|| exn::Exn::from(ErrorKind::MissingField(field)))?;
        for (language, text) in texts {
            localized.insert(language, text);
        }
        Ok(Some(localized))
    }

    pub fn required_localized(&self, field: &'static str) -> Result<LocalizedString> {
        self.localized(field)?.ok_or_else(|| exn::Exn::from(ErrorKind::MissingField(field)))
    }

    /// The fields shared by every record.
    pub fn meta(&self) -> Result<RecordMeta> {
        let id = self.required_text("id")?;
        let unique_key = self.required_text("unique_key")?;
        if !is_valid_unique_key(&unique_key) {
            exn::bail!(ErrorKind::ParseError {
                field: "unique_key",
                value: unique_key,
            });
        }
        let updated_at = self.required_date("updated_at")?;
        Ok(RecordMeta { id, unique_key, updated_at })
    }
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(text, &Rfc3339).ok().map(|dt| dt.date()))
}

/// Parses `true/false/1/0/yes/no/y/n` (case-insensitive).
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
