//! Merging freshly aggregated articles into the archive.
//!
//! The archive only ever grows: an article already present (by URL) is kept
//! exactly as stored, and a fresh article is added only when its URL is new.

use crate::models::{Article, sort_newest_first};
use crate::outputs::json::{load_store, save_store};
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// The archive after a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Existing and newly added articles, newest first.
    pub articles: Vec<Article>,
    /// How many fresh articles were added.
    pub added: usize,
}

/// Merge `fresh` into `existing`, never replacing an existing record.
pub fn merge(existing: Vec<Article>, fresh: Vec<Article>) -> Merged {
    let mut urls: HashSet<String> = existing.iter().map(|a| a.url.clone()).collect();
    let mut articles = existing;
    let mut added = 0;

    for article in fresh {
        if urls.insert(article.url.clone()) {
            articles.push(article);
            added += 1;
        }
    }

    sort_newest_first(&mut articles);
    Merged { articles, added }
}

/// Load the archive at `store`, merge `fresh` into it and write it back.
///
/// Nothing is written when the existing archive cannot be read.
#[instrument(level = "info", skip(fresh), fields(fresh = fresh.len()))]
pub async fn merge_into_store(
    store: &Path,
    fresh: Vec<Article>,
) -> Result<Merged, Box<dyn Error + Send + Sync>> {
    let existing = load_store(store).await?;
    let merged = merge(existing, fresh);
    save_store(store, &merged.articles).await?;
    info!(
        added = merged.added,
        total = merged.articles.len(),
        "Merged new articles"
    );
    Ok(merged)
}
