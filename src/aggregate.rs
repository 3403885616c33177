//! Concurrent fan-out of fetch + classify across all search targets.
//!
//! Every target is fetched and classified by its own future; at most
//! `concurrency` of them are in flight at once (`buffer_unordered`), which
//! bounds simultaneous requests to the aggregator independently of how many
//! targets there are.
//!
//! # Determinism
//!
//! Workers finish in any order. The same article often satisfies several
//! entity queries, so each worker claims an article's URL in a run-scoped
//! [`SeenUrls`] before keeping it; exactly one copy survives, though which
//! worker wins is unspecified. The final date sort is the only ordering
//! guarantee.

use crate::catalog::Catalog;
use crate::classify::{Classifier, Rejection};
use crate::models::{Article, RawEntry, sort_newest_first};
use crate::query::search_targets;
use crate::scrapers::{FeedSource, FetchError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument, trace, warn};

/// Default number of concurrent aggregator requests.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// URLs already accepted during one aggregation run.
#[derive(Debug, Default)]
pub struct SeenUrls {
    inner: Mutex<HashSet<String>>,
}

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`; true only for the first caller.
    pub fn claim(&self, url: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Result of one aggregation run.
#[derive(Debug, Default)]
pub struct AggregateReport {
    /// Unique articles, newest first.
    pub articles: Vec<Article>,
    /// Number of targets queried.
    pub targets: usize,
    /// Targets whose fetch failed and contributed nothing.
    pub failed_queries: usize,
    /// Accepted entries dropped because another worker already claimed the URL.
    pub duplicates: usize,
    /// Rejected entries per reason.
    pub rejected: HashMap<Rejection, usize>,
}

#[derive(Debug, Default)]
struct TargetOutcome {
    articles: Vec<Article>,
    duplicates: usize,
    rejected: HashMap<Rejection, usize>,
}

fn classify_entries(
    classifier: Classifier<'_>,
    seen: &SeenUrls,
    entries: &[RawEntry],
    now: DateTime<Utc>,
) -> TargetOutcome {
    let mut outcome = TargetOutcome::default();
    for entry in entries {
        match classifier.classify(entry, now) {
            Ok(article) if seen.claim(&article.url) => outcome.articles.push(article),
            Ok(_) => outcome.duplicates += 1,
            Err(reason) => {
                trace!(url = %entry.link, %reason, "Rejected entry");
                *outcome.rejected.entry(reason).or_default() += 1;
            }
        }
    }
    outcome
}

/// Fetch and classify every target, returning unique articles newest first.
///
/// Failed fetches are logged and counted, never propagated. `now` is the
/// single run timestamp used for every recency decision and date fallback.
#[instrument(level = "info", skip_all, fields(targets = targets.len(), concurrency = concurrency))]
pub async fn aggregate<S>(
    source: &S,
    catalog: &Catalog,
    targets: &[String],
    concurrency: usize,
    now: DateTime<Utc>,
) -> AggregateReport
where
    S: FeedSource + Sync,
{
    let start_time = std::time::Instant::now();
    let classifier = Classifier::new(catalog);
    let seen = SeenUrls::new();

    let outcomes: Vec<(String, Result<TargetOutcome, FetchError>)> =
        stream::iter(targets.iter().cloned())
            .map(|target| {
                let seen = &seen;
                async move {
                    let result = source
                        .fetch(&target)
                        .await
                        .map(|entries| classify_entries(classifier, seen, &entries, now));
                    (target, result)
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    let mut report = AggregateReport {
        targets: targets.len(),
        ..Default::default()
    };
    for (target, result) in outcomes {
        match result {
            Ok(outcome) => {
                debug!(
                    %target,
                    kept = outcome.articles.len(),
                    duplicates = outcome.duplicates,
                    "Classified target feed"
                );
                report.articles.extend(outcome.articles);
                report.duplicates += outcome.duplicates;
                for (reason, count) in outcome.rejected {
                    *report.rejected.entry(reason).or_default() += count;
                }
            }
            Err(e) => {
                warn!(%target, error = %e, "Query failed; treating as empty");
                report.failed_queries += 1;
            }
        }
    }

    sort_newest_first(&mut report.articles);

    let elapsed = start_time.elapsed();
    info!(
        articles = report.articles.len(),
        unique_urls = seen.len(),
        failed_queries = report.failed_queries,
        duplicates = report.duplicates,
        rejected = ?report.rejected,
        millis = elapsed.as_millis() as u64,
        "Aggregation complete"
    );
    report
}

/// One full run over the catalog's search targets, timestamped now.
pub async fn collect_latest<S>(source: &S, catalog: &Catalog, concurrency: usize) -> AggregateReport
where
    S: FeedSource + Sync,
{
    let targets = search_targets(catalog);
    aggregate(source, catalog, &targets, concurrency, Utc::now()).await
}
