//! HTTP source backend.
//!
//! Fetches dataset files relative to a base URL, for deployments where the
//! data lives behind a static file host rather than on local disk.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, path::validate as validate_path};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, StatusCode, Url};
use std::path::Path;

/// HTTP source backend.
///
/// `read("events.json")` against a base of `https://cdn.example/data/`
/// issues `GET https://cdn.example/data/events.json`. The base URL is
/// always treated as a directory, whether or not it ends in a slash.
///
/// # Examples
///
/// ```no_run
/// use wiki_storage::backend::HttpBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("cdn", "https://cdn.example/data")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpBackend {
    name: String,
    base: Url,
    client: Client,
}
impl HttpBackend {
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).or_raise(|| ErrorKind::InvalidUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::BackendError("could not construct HTTP client".to_string()))?;
        Ok(Self { name: name.into(), base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The source's URL, each path component percent-encoded as one segment.
    fn url(&self, path: &Path) -> Result<Url> {
        let validated = validate_path(path)?;
        let mut segments = Vec::new();
        for component in validated.components() {
            let Some(segment) = component.as_os_str().to_str() else {
                exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
            };
            segments.push(segment);
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ErrorKind::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn status_error(status: StatusCode, url: &Url, path: &Path) -> ErrorKind {
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::NotFound(path.to_path_buf()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Network(format!("{url} responded with {status}")),
        }
    }
}

#[async_trait]
impl StorageBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(backend = %self.name))]
    async fn exists(&self, path: &Path) -> Result<bool> {
        let url = self.url(path)?;
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .or_raise(|| ErrorKind::Network(format!("HEAD {url}")))?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
            status => exn::bail!(Self::status_error(status, &url, path)),
        }
    }

    #[tracing::instrument(skip(self), fields(backend = %self.name))]
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .or_raise(|| ErrorKind::Network(format!("GET {url}")))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(Self::status_error(status, &url, path));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network(format!("reading body of {url}")))?;
        tracing::debug!(bytes = body.len(), "source fetched");
        Ok(body.to_vec())
    }
}
