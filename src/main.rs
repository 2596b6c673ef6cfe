//! Command-line front end: loads the configured datasets and exposes
//! search, listing and lookup over them.

mod commands;

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wiki_cache::Cache;
use wiki_config::{BackendConfig, Config};
use wiki_content::ContentKind;
use wiki_content::models::Language;
use wiki_library::{ContentLoader, Sources};
use wiki_search::{SearchIndexService, SearchSettings};
use wiki_storage::BackendHandle;
use wiki_storage::backend::LocalBackend;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (`.toml`, `.yaml` or `.json`).
    #[arg(short, long, global = true, env = "WIKI_CONFIG")]
    config: Option<PathBuf>,
    /// Log more (`-v` info, `-vv` debug, `-vvv` trace). `RUST_LOG` wins.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show where each content type is read from.
    Sources,
    /// Load every dataset and report what was kept and dropped.
    Check,
    /// Search every content type.
    Search(SearchArgs),
    /// Count matches per content type, in the default language.
    Counts { query: String },
    /// List one content type through its listing filters.
    List(ListArgs),
    /// Show one record.
    Show {
        #[arg(value_parser = parse_kind)]
        kind: ContentKind,
        unique_key: String,
        #[arg(short, long, value_parser = parse_language)]
        lang: Option<Language>,
    },
}

#[derive(Debug, Args)]
struct SearchArgs {
    query: String,
    /// Restrict to a content type. Repeatable.
    #[arg(short = 't', long = "type", value_parser = parse_kind)]
    types: Vec<ContentKind>,
    #[arg(short, long)]
    limit: Option<usize>,
    #[arg(short = 'L', long, value_parser = parse_language)]
    lang: Option<Language>,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(value_parser = parse_kind)]
    kind: ContentKind,
    /// Filter state as a URL query string, e.g. `rarity=SSR&sort=a-z`.
    #[arg(short, long, default_value = "")]
    query: String,
    /// Page to show. Overrides any `page` in the query.
    #[arg(short, long)]
    page: Option<usize>,
    #[arg(short = 'L', long, value_parser = parse_language)]
    lang: Option<Language>,
}

fn parse_kind(value: &str) -> std::result::Result<ContentKind, String> {
    value.parse().map_err(|err: wiki_content::error::Error| (*err).to_string())
}

fn parse_language(value: &str) -> std::result::Result<Language, String> {
    value.parse().map_err(|err: wiki_content::error::Error| (*err).to_string())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Renders an error with every frame of its tree and where each was raised.
pub(crate) fn diagnostic<E: std::error::Error + Send + Sync + 'static>(err: exn::Exn<E>) -> miette::Report {
    miette!("{err:?}")
}

fn backend(config: &Config) -> Result<BackendHandle> {
    match &config.data.backend {
        BackendConfig::Local { root } => {
            let root = if root.is_relative() { std::env::current_dir().into_diagnostic()?.join(root) } else { root.clone() };
            let backend = LocalBackend::new("local", &root).map_err(diagnostic)?;
            Ok(Arc::new(backend))
        },
        #[cfg(feature = "http")]
        BackendConfig::Http { base_url } => {
            let backend = wiki_storage::backend::HttpBackend::new("http", base_url).map_err(diagnostic)?;
            Ok(Arc::new(backend))
        },
        #[cfg(not(feature = "http"))]
        BackendConfig::Http { base_url } => {
            Err(miette!("cannot read from {base_url}: built without the `http` feature"))
        },
    }
}

/// Everything a command may need, wired from one configuration.
pub(crate) struct Context {
    pub config: Config,
    pub loader: ContentLoader,
    pub search: SearchIndexService,
}
impl Context {
    fn new(config: Config) -> Result<Self> {
        let sources: Sources = config.sources().into_iter().collect();
        let loader = ContentLoader::new(backend(&config)?, Arc::new(Cache::new()), sources);
        let settings = SearchSettings {
            default_limit: config.search.default_limit,
            languages: config.search.languages.clone(),
            default_language: config.search.default_language,
        };
        let search = SearchIndexService::new(loader.clone(), settings);
        Ok(Self { config, loader, search })
    }

    pub fn language(&self, requested: Option<Language>) -> Language {
        requested.unwrap_or(self.config.search.default_language)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).map_err(diagnostic)?;
    tracing::debug!(?config, "configuration loaded");
    let context = Context::new(config)?;

    match cli.command {
        Command::Sources => commands::sources(&context).await,
        Command::Check => commands::check(&context).await,
        Command::Search(args) => commands::search(&context, args).await,
        Command::Counts { query } => commands::counts(&context, &query).await,
        Command::List(args) => commands::list(&context, args).await,
        Command::Show { kind, unique_key, lang } => commands::show(&context, kind, &unique_key, lang).await,
    }
}
