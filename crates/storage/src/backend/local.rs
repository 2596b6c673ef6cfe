//! Local filesystem source backend.
//!
//! Sources are files in a configured directory, read via `tokio::fs`.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem source backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use wiki_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/srv/wiki/data")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    /// Root directory holding the dataset files
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is not
    /// absolute, or exists but is not a directory.
    /// [`NotFound`](ErrorKind::NotFound) if it does not exist. A read-only
    /// backend has nothing to offer from a directory it would have to create.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if !root.exists() {
            exn::bail!(ErrorKind::NotFound(root));
        }
        if !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(backend = %self.name))]
    async fn exists(&self, path: &Path) -> Result<bool> {
        let full_path = self.absolute_path(path)?;
        let exists = fs::try_exists(&full_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(exists && full_path.is_file())
    }

    #[tracing::instrument(skip(self), fields(backend = %self.name))]
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.absolute_path(path)?;
        let data = fs::read(&full_path).await.map_err(|e| Self::map_io_error(e, path))?;
        tracing::debug!(bytes = data.len(), "source read");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (path, data) in files {
            let full = temp_dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, data).unwrap();
        }
        let backend = LocalBackend::new("local", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_new_requires_absolute_existing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", "./relative").is_err());

        let missing = temp_dir.path().join("missing");
        let err = LocalBackend::new("name", &missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if p == &missing));
        // Unlike a writable store, nothing is created on our behalf.
        assert!(!missing.exists());

        let file = temp_dir.path().join("file.csv");
        std::fs::write(&file, b"id").unwrap();
        let err = LocalBackend::new("name", &file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_absolute_path() {
        let (temp_dir, backend) = backend_with(&[]);
        let expected = temp_dir.path().join("2024/events.json");
        assert_eq!(backend.absolute_path(Path::new("2024/events.json")).unwrap(), expected);
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_read() {
        let (_temp_dir, backend) = backend_with(&[("characters.csv", b"id,unique_key\n1,kasumi\n")]);
        let data = backend.read(Path::new("characters.csv")).await.unwrap();
        assert_eq!(data, b"id,unique_key\n1,kasumi\n");
    }

    #[tokio::test]
    async fn test_read_nested() {
        let (_temp_dir, backend) = backend_with(&[("archive/2024/events.json", b"[]")]);
        assert_eq!(backend.read(Path::new("archive/2024/events.json")).await.unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let (_temp_dir, backend) = backend_with(&[]);
        let err = backend.read(Path::new("events.json")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if p == Path::new("events.json")));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_exists() {
        let (_temp_dir, backend) = backend_with(&[("items.csv", b""), ("nested/tools.json", b"[]")]);
        assert!(backend.exists(Path::new("items.csv")).await.unwrap());
        assert!(backend.exists(Path::new("nested/tools.json")).await.unwrap());
        assert!(!backend.exists(Path::new("missing.csv")).await.unwrap());
        // Directories are not sources, even when named like one.
        std::fs::create_dir(backend.root().join("archive.json")).unwrap();
        assert!(!backend.exists(Path::new("archive.json")).await.unwrap());
        let err = backend.exists(Path::new("nested")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_path_security() {
        let (_temp_dir, backend) = backend_with(&[]);
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.read(Path::new("etc/../../passwd")).await.is_err());
        assert!(backend.exists(Path::new("../../file")).await.is_err());
    }
}
