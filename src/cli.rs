//! Command-line interface definitions for Amami News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options can also be provided through environment variables.

use crate::aggregate::DEFAULT_CONCURRENCY;
use crate::outputs::json::DEFAULT_STORE_PATH;
use crate::query::GOOGLE_NEWS_SEARCH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Amami News collector.
///
/// # Examples
///
/// ```sh
/// # Scheduled run: merge the latest articles into the archive
/// amami_news collect --store news_data/news.json
///
/// # Print the latest articles as JSON without touching the archive
/// amami_news fetch
///
/// # Serve /api/news on port 5000
/// amami_news serve --bind 0.0.0.0:5000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML catalog overriding the built-in entities and sources
    #[arg(short, long, global = true, env = "AMAMI_NEWS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Maximum number of simultaneous aggregator requests
    #[arg(long, global = true, env = "AMAMI_NEWS_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "AMAMI_NEWS_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Aggregator search endpoint
    #[arg(long, global = true, env = "AMAMI_NEWS_ENDPOINT", default_value = GOOGLE_NEWS_SEARCH)]
    pub endpoint: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the latest articles and print them as JSON
    Fetch,
    /// Fetch the latest articles and merge them into the archive
    Collect {
        /// Archive file to merge into
        #[arg(short, long, default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },
    /// Serve the latest articles over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:5000")]
        bind: String,
    },
}
