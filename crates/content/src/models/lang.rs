//! Display languages and per-language text.
//!
//! The wiki ships five display languages. Source datasets and callers spell
//! them in several ways (`ja` vs `jp`, `zh-Hant` vs `tw`), so every spelling
//! is normalized through [`Language::from_str`] before use.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// A supported display language.
///
/// Ordering follows declaration order, with English first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "&'static str"))]
pub enum Language {
    En,
    Jp,
    Cn,
    Tw,
    Kr,
}
impl Language {
    /// Every supported language, English first.
    pub const ALL: [Language; 5] = [Self::En, Self::Jp, Self::Cn, Self::Tw, Self::Kr];

    /// Returns the canonical code, as used in CSV column suffixes and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Jp => "jp",
            Language::Cn => "cn",
            Language::Tw => "tw",
            Language::Kr => "kr",
        }
    }
}
impl TryFrom<String> for Language {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl From<Language> for &'static str {
    fn from(value: Language) -> Self {
        value.as_str()
    }
}
impl FromStr for Language {
    type Err = Error;

    /// # Examples
    ///
    /// ```
    /// use wiki_content::models::Language;
    /// assert_eq!("ja".parse::<Language>().unwrap(), Language::Jp);
    /// assert_eq!("zh-Hant".parse::<Language>().unwrap(), Language::Tw);
    /// assert!("xx".parse::<Language>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        Ok(match sanitized.as_str() {
            "en" | "enus" | "engb" | "english" => Self::En,
            "jp" | "ja" | "jajp" | "japanese" => Self::Jp,
            "cn" | "zh" | "zhcn" | "zhhans" | "zhsg" | "chinese" | "simplifiedchinese" => Self::Cn,
            "tw" | "zhtw" | "zhhant" | "zhhk" | "traditionalchinese" => Self::Tw,
            "kr" | "ko" | "kokr" | "korean" => Self::Kr,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "language",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Text with one translation per language.
///
/// Always holds a non-blank English entry, which is the fallback for every
/// other language. The only way to build one is from that English text, so
/// the invariant can't be broken after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    entries: BTreeMap<Language, String>,
}
impl LocalizedString {
    /// Returns `None` if `en` is blank.
    pub fn new(en: impl Into<String>) -> Option<Self> {
        let en = en.into();
        if en.trim().is_empty() {
            return None;
        }
        Some(Self { entries: BTreeMap::from([(Language::En, en)]) })
    }

    /// Adds (or replaces) a translation. Blank text is ignored, and so is
    /// an attempt to blank out the English entry.
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.insert(language, text);
        self
    }

    pub fn insert(&mut self, language: Language, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.entries.insert(language, text);
        }
    }

    /// The English text.
    pub fn en(&self) -> &str {
        self.entries.get(&Language::En).map(String::as_str).unwrap_or_default()
    }

    /// The text for `language`, falling back to English when that
    /// translation is missing.
    pub fn get(&self, language: Language) -> &str {
        self.entries.get(&language).map(String::as_str).unwrap_or_else(|| self.en())
    }

    /// Whether a translation (not the fallback) exists for `language`.
    pub fn has(&self, language: Language) -> bool {
        self.entries.contains_key(&language)
    }

    /// Translations present, English first.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        self.entries.iter().map(|(language, text)| (*language, text.as_str()))
    }
}
impl Display for LocalizedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.en())
    }
}

/// Resolves `value` in `language`, falling back to English.
///
/// # Examples
///
/// ```
/// use wiki_content::models::{Language, LocalizedString, get_localized_value};
/// let title = LocalizedString::new("Title").unwrap();
/// assert_eq!(get_localized_value(&title, Language::Jp), "Title");
/// ```
pub fn get_localized_value(value: &LocalizedString, language: Language) -> &str {
    value.get(language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", Language::En)]
    #[case("EN-us", Language::En)]
    #[case("ja", Language::Jp)]
    #[case("JP", Language::Jp)]
    #[case("zh-CN", Language::Cn)]
    #[case("zh_Hans", Language::Cn)]
    #[case("zh-TW", Language::Tw)]
    #[case("zh-Hant", Language::Tw)]
    #[case("ko", Language::Kr)]
    #[case(" kr ", Language::Kr)]
    fn test_language_aliases(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("fr")]
    #[case("zh-XX")]
    fn test_unknown_language(#[case] input: &str) {
        let err = input.parse::<Language>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "language", .. }));
    }

    #[test]
    fn test_fallback_to_english() {
        let title = LocalizedString::new("Title").unwrap();
        assert_eq!(get_localized_value(&title, Language::Jp), "Title");
        assert_eq!(get_localized_value(&title, Language::En), "Title");
        assert!(!title.has(Language::Jp));
    }

    #[test]
    fn test_translation_preferred() {
        let name = LocalizedString::new("Kasumi").unwrap().with(Language::Jp, "かすみ");
        assert_eq!(name.get(Language::Jp), "かすみ");
        assert_eq!(name.get(Language::Kr), "Kasumi");
        assert_eq!(name.to_string(), "Kasumi");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_english_rejected(#[case] en: &str) {
        assert!(LocalizedString::new(en).is_none());
    }

    #[test]
    fn test_blank_translations_ignored() {
        let name = LocalizedString::new("Kasumi").unwrap().with(Language::Jp, "  ").with(Language::En, "");
        assert!(!name.has(Language::Jp));
        assert_eq!(name.en(), "Kasumi");
        assert_eq!(name.iter().count(), 1);
    }
}
