/// Splits `text` into lowercase tokens.
///
/// Any character that is not alphanumeric (in the Unicode sense) is a
/// separator, so punctuation, whitespace and symbols never end up inside a
/// token. Order and repeats are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// The tokens of `text` joined by single spaces, used to compare whole titles
/// against whole queries.
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("   ", &[])]
    #[case("Kasumi", &["kasumi"])]
    #[case("Summer-Festival 2024!", &["summer", "festival", "2024"])]
    #[case("Kasumi's  Sister", &["kasumi", "s", "sister"])]
    #[case("POW/TEC/STM", &["pow", "tec", "stm"])]
    #[case("かすみ・あやね", &["かすみ", "あやね"])]
    #[case("Ünïcode ÉVENT", &["ünïcode", "évent"])]
    fn test_tokenize(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(tokenize(text), expected);
    }

    #[rstest]
    #[case("  Venus   Vacation ", "venus vacation")]
    #[case("Mist (Kasumi)", "mist kasumi")]
    #[case("...", "")]
    fn test_normalize(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(normalize(text), expected);
    }
}
