//! Search target derivation and aggregator query construction.

use crate::catalog::{Catalog, SourcePolicy};
use itertools::Itertools;

/// Google News RSS search endpoint.
pub const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";

/// Distinct display names across municipalities and islands.
///
/// Municipalities come first; a repeated name keeps its first position.
pub fn search_targets(catalog: &Catalog) -> Vec<String> {
    catalog
        .municipalities
        .iter()
        .chain(catalog.islands.iter())
        .map(|entity| entity.name.clone())
        .unique()
        .collect()
}

/// The raw query text: an exact phrase restricted to the allowed domains.
///
/// ```ignore
/// "奄美市" AND (site:amamishimbun.co.jp OR site:nankainn.com)
/// ```
pub fn build_query(target: &str, sources: &SourcePolicy) -> String {
    let sites = sources
        .allowed
        .iter()
        .map(|s| format!("site:{}", s.domain))
        .join(" OR ");
    format!("\"{}\" AND ({})", target, sites)
}

/// Full search URL for `target`, with Japanese language and region fixed.
pub fn build_search_url(endpoint: &str, target: &str, sources: &SourcePolicy) -> String {
    format!(
        "{}?q={}&hl=ja&gl=JP&ceid=JP:ja",
        endpoint,
        urlencoding::encode(&build_query(target, sources))
    )
}
