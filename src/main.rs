//! # Amami News
//!
//! A news collection pipeline for the Amami archipelago. It searches Google
//! News once per municipality and island, keeps only articles from a fixed
//! set of local publishers, files each article under the municipality (or,
//! failing that, the island) its headline names, and either returns the list
//! or merges it into a growing JSON archive.
//!
//! ## Usage
//!
//! ```sh
//! amami_news collect --store news_data/news.json   # scheduled
//! amami_news fetch                                 # print JSON once
//! amami_news serve --bind 0.0.0.0:5000             # GET /api/news
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Querying**: One site-restricted search per entity name
//! 2. **Fetching**: Feeds are fetched concurrently (10 at a time by default)
//! 3. **Classifying**: Recency, block keyword, source and entity checks per entry
//! 4. **Aggregating**: Duplicate URLs collapse to one article, newest first
//! 5. **Merging** (`collect` only): New URLs are added to the archive, existing
//!    records are never touched

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod catalog;
mod classify;
mod cli;
mod history;
mod models;
mod outputs;
mod query;
mod scrapers;
mod server;
mod utils;

use aggregate::collect_latest;
use catalog::Catalog;
use cli::{Cli, Command};
use scrapers::google_news::GoogleNews;
use server::AppState;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("amami_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let catalog = Catalog::load(args.catalog.as_deref()).await?;
    let source = GoogleNews::new(
        &args.endpoint,
        Duration::from_secs(args.timeout_secs),
        catalog.sources.clone(),
    )?;

    match args.command {
        Command::Fetch => {
            let report = collect_latest(&source, &catalog, args.concurrency).await;
            println!("{}", serde_json::to_string_pretty(&report.articles)?);
        }
        Command::Collect { store } => {
            run_collect(&source, &catalog, args.concurrency, &store).await?;
        }
        Command::Serve { bind } => {
            let state = AppState {
                source: Arc::new(source),
                catalog: Arc::new(catalog),
                concurrency: args.concurrency,
            };
            server::serve(&bind, state).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Aggregate, then merge into the archive at `store`.
#[instrument(level = "info", skip(source, catalog))]
async fn run_collect(
    source: &GoogleNews,
    catalog: &Catalog,
    concurrency: usize,
    store: &Path,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Early check so a bad path fails before any network traffic
    let dir = store
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_writable_dir(dir).await?;

    let report = collect_latest(source, catalog, concurrency).await;
    let failed_queries = report.failed_queries;
    let merged = history::merge_into_store(store, report.articles).await?;
    info!(
        added = merged.added,
        total = merged.articles.len(),
        failed_queries,
        "Collect run finished"
    );
    Ok(())
}
