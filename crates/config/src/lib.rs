//! Layered configuration.
//!
//! Values are merged from, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. `config.toml` in the platform configuration directory,
//! 3. an explicitly named file (`.toml`, `.yaml`/`.yml` or `.json`),
//! 4. `WIKI_`-prefixed environment variables, with `__` separating nested
//!    keys (`WIKI_SEARCH__DEFAULT_LIMIT=50`).

pub mod error;

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use wiki_content::{ContentKind, SourceFormat, models::Language};

use crate::error::{ErrorKind, Result};

pub const ENV_PREFIX: &str = "WIKI_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub search: SearchConfig,
    pub filter: FilterSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub backend: BackendConfig,
    /// Per-type source path overrides. Types not listed use their default
    /// source file.
    pub sources: BTreeMap<ContentKind, String>,
}

/// Where dataset sources are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// A directory on disk. Relative roots are resolved against the working
    /// directory by the caller.
    Local { root: PathBuf },
    /// A static file host. Only usable when built with the `http` feature.
    Http { base_url: String },
}
impl Default for BackendConfig {
    fn default() -> Self {
        Self::Local { root: PathBuf::from("data") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    /// Languages to build search indexes for. Must include English.
    pub languages: Vec<Language>,
    pub default_language: Language,
}
impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            languages: Language::ALL.to_vec(),
            default_language: Language::En,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub page_size: usize,
}
impl Default for FilterSettings {
    fn default() -> Self {
        Self { page_size: 24 }
    }
}

impl Config {
    /// Loads every layer, reading the platform configuration file if there
    /// is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user = Self::default_config_path();
        Self::from_figment(Self::layered(user.as_deref(), explicit)?)
    }

    /// `config.toml` inside the platform configuration directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "wiki").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Builds the layered figment without extracting it.
    ///
    /// `user` may be missing on disk (it is skipped); `explicit` must exist.
    pub fn layered(user: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user {
            tracing::debug!(path = %user.display(), "merging platform configuration");
            figment = figment.merge(Toml::file(user));
        }
        if let Some(explicit) = explicit {
            if !explicit.is_file() {
                exn::bail!(ErrorKind::NotFound(explicit.to_path_buf()));
            }
            tracing::debug!(path = %explicit.display(), "merging configuration file");
            figment = Self::merge_file(figment, explicit)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    /// Extracts and validates a configuration.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config =
            figment.extract().map_err(|err| exn::Exn::from(ErrorKind::Malformed(err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            exn::bail!(ErrorKind::Invalid("search.default_limit must be greater than zero".to_string()));
        }
        if self.filter.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("filter.page_size must be greater than zero".to_string()));
        }
        if !self.search.languages.contains(&Language::En) {
            exn::bail!(ErrorKind::Invalid("search.languages must include en".to_string()));
        }
        if !self.search.languages.contains(&self.search.default_language) {
            exn::bail!(ErrorKind::Invalid(format!(
                "search.default_language `{}` is not one of search.languages",
                self.search.default_language
            )));
        }
        match &self.data.backend {
            BackendConfig::Local { root } if root.as_os_str().is_empty() => {
                exn::bail!(ErrorKind::Invalid("data.backend.root must not be empty".to_string()))
            },
            BackendConfig::Http { base_url } if base_url.trim().is_empty() => {
                exn::bail!(ErrorKind::Invalid("data.backend.base_url must not be blank".to_string()))
            },
            _ => {},
        }
        for (kind, source) in &self.data.sources {
            if SourceFormat::from_path(source).is_none() {
                exn::bail!(ErrorKind::Invalid(format!(
                    "data.sources.{kind}: `{source}` must end in .csv or .json"
                )));
            }
        }
        Ok(())
    }

    /// The source path for every content type, overrides applied.
    pub fn sources(&self) -> BTreeMap<ContentKind, String> {
        ContentKind::ALL
            .into_iter()
            .map(|kind| {
                let source = self.data.sources.get(&kind).cloned();
                (kind, source.unwrap_or_else(|| kind.default_source().to_string()))
            })
            .collect()
    }
}
