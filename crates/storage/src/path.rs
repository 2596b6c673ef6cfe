//! Dataset source paths.
//!
//! Source paths come from configuration, so they are checked before any
//! backend touches them: a source is a `.csv` or `.json` file that resolves
//! inside the data root.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// File extensions a dataset source may have, compared case-insensitively.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["csv", "json"];

/// Resolves a dataset source path relative to the data root.
///
/// `.` and repeated separators are dropped, `..` is resolved lexically and
/// a leading `/` is ignored. Fails with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath) when the path
/// leaves the root, contains a null byte, carries a drive prefix, or does
/// not name a `.csv`/`.json` file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wiki_storage::validate_path;
///
/// assert!(validate_path("characters.csv").is_ok());
/// assert!(validate_path("2024/events.JSON").is_ok());
/// assert!(validate_path("../secrets.json").is_err());
/// assert!(validate_path("2024/").is_err());
/// assert!(validate_path("notes.txt").is_err());
/// assert_eq!(
///     validate_path("drafts/.././/datasets/items.csv").unwrap(),
///     Path::new("datasets/items.csv")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            // Null bytes survive Path::components() on Unix but truncate the
            // path at the syscall boundary.
            Component::Normal(name) if !name.as_encoded_bytes().contains(&0) => components.push(name),
            Component::CurDir | Component::RootDir => {},
            Component::ParentDir if components.pop().is_some() => {},
            _ => exn::bail!(invalid()),
        }
    }
    let source: PathBuf = components.into_iter().collect();
    let extension = source.extension().and_then(OsStr::to_str).map(str::to_ascii_lowercase);
    match extension {
        Some(extension) if SOURCE_EXTENSIONS.contains(&extension.as_str()) => Ok(source),
        _ => exn::bail!(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("characters.csv", "characters.csv")]
    #[case("2024/events.json", "2024/events.json")]
    #[case("a//b//quizzes.json", "a/b/quizzes.json")]
    #[case("a/./b/./items.csv", "a/b/items.csv")]
    #[case("/absolute/tools.json", "absolute/tools.json")]
    #[case("drafts/../guides.json", "guides.json")]
    #[case("Swimsuits.CSV", "Swimsuits.CSV")]
    fn test_valid_sources(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("../events.json")]
    #[case("a/../../b.csv")]
    #[case("..")]
    #[case("events.json/..")]
    fn test_traversal_attempts(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(p) if p == Path::new(input)));
    }

    #[rstest]
    #[case("datasets/")]
    #[case("events")]
    #[case("events.yaml")]
    #[case("events.json.bak")]
    #[case(".json")]
    fn test_not_a_source_file(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("a\0b.csv")]
    #[case("\0")]
    #[case("")]
    #[case("./.")]
    #[case("//")]
    fn test_invalid_paths(#[case] input: &str) {
        assert!(validate(input).is_err());
    }
}
