use regex::Regex;
use std::sync::LazyLock;
use time::Date;

static UNIQUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:[-_][A-Za-z0-9]+)*$").expect("unique key pattern is valid"));

/// Fields shared by every content record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordMeta {
    /// Opaque stable identifier.
    pub id: String,
    /// URL-safe slug, unique within its content type.
    pub unique_key: String,
    /// Day of the last content change.
    pub updated_at: Date,
}

/// Whether `key` is a URL-safe slug: ASCII alphanumeric runs joined by
/// single `-` or `_` characters.
///
/// # Examples
///
/// ```
/// use wiki_content::models::is_valid_unique_key;
/// assert!(is_valid_unique_key("kasumi_ssr-01"));
/// assert!(!is_valid_unique_key("kasumi--ssr"));
/// assert!(!is_valid_unique_key("ka sumi"));
/// ```
pub fn is_valid_unique_key(key: &str) -> bool {
    UNIQUE_KEY.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("kasumi", true)]
    #[case("Kasumi2", true)]
    #[case("summer-event_2024", true)]
    #[case("a", true)]
    #[case("", false)]
    #[case("-kasumi", false)]
    #[case("kasumi-", false)]
    #[case("kasumi__ssr", false)]
    #[case("kasumi/ssr", false)]
    #[case("かすみ", false)]
    fn test_unique_key(#[case] key: &str, #[case] valid: bool) {
        assert_eq!(is_valid_unique_key(key), valid);
    }
}
