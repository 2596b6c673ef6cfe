//! In-memory source backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory source backend for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all methods
/// operate on `&self` without external synchronisation. Besides serving
/// bytes it records how often each path was read and can be told to fail
/// reads for a path, which is what loader tests need to observe
/// deduplication and retries.
///
/// Every read yields to the scheduler once before answering, like a real
/// backend suspending on I/O, so concurrent callers genuinely interleave.
///
/// # Examples
///
/// ```
/// use wiki_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("events.json", b"[]"),
/// ]);
/// assert!(backend.exists(Path::new("events.json")).await?);
/// backend.read(Path::new("events.json")).await?;
/// assert_eq!(backend.read_count("events.json"), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<PathBuf, Vec<u8>>>,
    reads: std::sync::Mutex<HashMap<PathBuf, usize>>,
    failing: std::sync::Mutex<HashSet<PathBuf>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            map.insert(Self::checked(path.into()), data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            reads: Default::default(),
            failing: Default::default(),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn checked(path: PathBuf) -> PathBuf {
        let Ok(validated) = validate_path(&path) else {
            // Fixture setup has no error path.
            panic!("MockBackend: invalid path {}", path.display());
        };
        validated
    }

    /// Replace (or add) the contents of a file.
    pub async fn put(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.storage.write().await.insert(Self::checked(path.into()), data.into());
    }

    /// Remove a file, so subsequent reads report it missing.
    pub async fn remove(&self, path: impl Into<PathBuf>) {
        self.storage.write().await.remove(&Self::checked(path.into()));
    }

    /// Make every read of `path` fail with a retryable network error until
    /// [`restore()`](Self::restore) is called.
    pub fn fail_reads(&self, path: impl Into<PathBuf>) {
        let path = Self::checked(path.into());
        self.failing.lock().unwrap_or_else(std::sync::PoisonError::into_inner).insert(path);
    }

    pub fn restore(&self, path: impl Into<PathBuf>) {
        let path = Self::checked(path.into());
        self.failing.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(&path);
    }

    /// How many times `path` has been read, failed reads included.
    pub fn read_count(&self, path: impl Into<PathBuf>) -> usize {
        let path = Self::checked(path.into());
        self.reads.lock().unwrap_or_else(std::sync::PoisonError::into_inner).get(&path).copied().unwrap_or(0)
    }

    /// Total number of reads across every path.
    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap_or_else(std::sync::PoisonError::into_inner).values().sum()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        *self.reads.lock().unwrap_or_else(std::sync::PoisonError::into_inner).entry(path.clone()).or_default() += 1;
        tokio::task::yield_now().await;
        if self.failing.lock().unwrap_or_else(std::sync::PoisonError::into_inner).contains(&path) {
            exn::bail!(ErrorKind::Network(format!("simulated failure reading {}", path.display())));
        }
        let data = self.storage.read().await.get(&path).cloned();
        data.ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}
