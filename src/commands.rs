use miette::{Result, miette};
use std::sync::Arc;
use wiki_content::models::Language;
use wiki_content::{Content, ContentKind};
use wiki_filter::{FilterOptions, FilterOverrides, Filterable, Preset, UnifiedFilter};
use wiki_search::SearchOptions;

use crate::{Context, ListArgs, SearchArgs, diagnostic};

pub async fn sources(context: &Context) -> Result<()> {
    let backend = context.loader.backend();
    println!("backend: {}", backend.name());
    for (kind, path) in context.loader.sources().iter() {
        let state = match backend.exists(path).await {
            Ok(true) => "ok".to_string(),
            Ok(false) => "missing".to_string(),
            Err(err) => format!("error: {}", *err),
        };
        println!("{:<12} {:<24} {state}", kind.plural(), path.display());
    }
    Ok(())
}

pub async fn check(context: &Context) -> Result<()> {
    let outcome = context.loader.initialize().await;
    for kind in ContentKind::ALL {
        let Some(report) = context.loader.report(kind) else {
            println!("{:<12} not loaded", kind.plural());
            continue;
        };
        let hash = report.source_hash.get(..12).unwrap_or(&report.source_hash);
        println!(
            "{:<12} {:>5} records {:>4} rejected  {hash}  {}",
            kind.plural(),
            report.records,
            report.rejected.len(),
            report.source.display()
        );
        for rejected in &report.rejected {
            println!("    {rejected}");
        }
    }
    outcome.map_err(diagnostic)
}

async fn build_indexes(context: &Context) -> Result<()> {
    context.search.build_indexes().await.map_err(diagnostic)
}

pub async fn search(context: &Context, args: SearchArgs) -> Result<()> {
    build_indexes(context).await?;
    let options = SearchOptions { limit: args.limit, types: args.types, language: args.lang };
    let response = context.search.search(&args.query, &options);
    for result in &response.results {
        println!(
            "{:>4}  {:<9}  {:<9}  {:<32} {}",
            result.score,
            result.match_kind.as_str(),
            result.document.kind.as_str(),
            result.document.unique_key,
            result.title
        );
    }
    let more = if response.has_more { ", more available" } else { "" };
    println!("{} of {} results in {:?}{more}", response.results.len(), response.total, response.search_time);
    Ok(())
}

pub async fn counts(context: &Context, query: &str) -> Result<()> {
    build_indexes(context).await?;
    let counts = context.search.type_counts(query);
    for (kind, count) in &counts {
        println!("{:<12} {count}", kind.plural());
    }
    println!("{:<12} {}", "total", counts.values().sum::<usize>());
    Ok(())
}

pub async fn list(context: &Context, args: ListArgs) -> Result<()> {
    context.loader.load(args.kind).await.map_err(diagnostic)?;
    let loader = &context.loader;
    match args.kind {
        ContentKind::Character => listing(context, loader.characters(), &args),
        ContentKind::Event => listing(context, loader.events(), &args),
        ContentKind::Swimsuit => listing(context, loader.swimsuits(), &args),
        ContentKind::Item => listing(context, loader.items(), &args),
        ContentKind::Guide => listing(context, loader.guides(), &args),
        ContentKind::Gacha => listing(context, loader.gachas(), &args),
        ContentKind::Episode => listing(context, loader.episodes(), &args),
        ContentKind::Tool => listing(context, loader.tools(), &args),
        ContentKind::Accessory => listing(context, loader.accessories(), &args),
        ContentKind::Mission => listing(context, loader.missions(), &args),
        ContentKind::Quiz => listing(context, loader.quizzes(), &args),
    }
}

fn listing<T: Filterable>(context: &Context, records: Arc<[T]>, args: &ListArgs) -> Result<()> {
    let language = context.language(args.lang);
    let overrides = FilterOverrides { page_size: Some(context.config.filter.page_size), ..FilterOverrides::default() };
    let options = FilterOptions::default().with_language(language).with_overrides(overrides);
    let mut filter = UnifiedFilter::new(Preset::from(args.kind), records, options);
    filter.config().validate().map_err(diagnostic)?;

    filter.from_query(&args.query);
    // A page from the query may be past the end of the filtered data.
    filter.set_page(args.page.unwrap_or(filter.state().page));

    for record in filter.page_items() {
        println!("{:<32} {}", record.unique_key(), record.title().get(language));
    }
    println!(
        "page {} of {}, {} of {} {} match {} filter(s), sorted by {}",
        filter.state().page,
        filter.total_pages(),
        filter.filtered_len(),
        filter.data().len(),
        args.kind.plural(),
        filter.active_filter_count(),
        filter.active_sort()
    );
    let query = filter.to_query();
    if !query.is_empty() {
        println!("?{query}");
    }
    Ok(())
}

pub async fn show(context: &Context, kind: ContentKind, unique_key: &str, lang: Option<Language>) -> Result<()> {
    context.loader.load(kind).await.map_err(diagnostic)?;
    let collection = context.loader.collection_of(kind).ok_or_else(|| miette!("{} are not loaded", kind.plural()))?;
    let record = collection
        .iter()
        .find(|record| record.unique_key() == unique_key)
        .ok_or_else(|| miette!("no {kind} has the unique key `{unique_key}`"))?;
    print_record(record, context.language(lang));
    Ok(())
}

fn print_record(record: &dyn Content, language: Language) {
    let meta = record.meta();
    println!("{}", record.title().get(language));
    println!("  type        {}", record.kind());
    println!("  id          {}", meta.id);
    println!("  unique key  {}", meta.unique_key);
    println!("  updated     {}", meta.updated_at);
    for (other, title) in record.title().iter().filter(|(other, _)| *other != language) {
        println!("  title ({other})  {title}");
    }
    for summary in record.summaries() {
        println!("  {}", summary.get(language));
    }
    if !record.keywords().is_empty() {
        println!("  keywords    {}", record.keywords().join(", "));
    }
    if !record.tags().is_empty() {
        println!("  tags        {}", record.tags().join(", "));
    }
}
