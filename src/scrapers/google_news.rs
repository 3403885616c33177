//! Google News RSS search client.
//!
//! Each search target becomes one request to the Google News RSS search
//! endpoint, restricted to the allowed publisher domains (see
//! [`crate::query::build_search_url`]).
//!
//! # Feed Shape
//!
//! Only these item elements are read:
//!
//! | Element | Field |
//! |---------|-------|
//! | `<link>` | [`RawEntry::link`] (required) |
//! | `<title>` | [`RawEntry::title`] (required) |
//! | `<pubDate>` | [`RawEntry::published`] |
//! | `<source>` text | [`RawEntry::source`] |
//! | `<description>` | [`RawEntry::summary`] |
//! | `<guid>` | [`RawEntry::guid`] |

use super::{FeedSource, FetchError};
use crate::catalog::SourcePolicy;
use crate::models::RawEntry;
use crate::query::build_search_url;
use crate::utils::truncate_for_log;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    guid: Option<TextElement>,
    source: Option<TextElement>,
}

/// An element whose attributes we ignore and whose text we keep.
#[derive(Debug, Deserialize)]
struct TextElement {
    #[serde(rename = "$text", default)]
    text: String,
}

/// Parse a Google News RSS document into raw entries.
///
/// Items lacking a link or a title are skipped; blank optional elements are
/// treated as absent. Titles are kept exactly as published.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>, FetchError> {
    let rss: Rss = from_str(xml)?;
    let total = rss.channel.items.len();

    let entries: Vec<RawEntry> = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let link = non_blank(item.link)?;
            let title = item.title.filter(|t| !t.trim().is_empty())?;
            Some(RawEntry {
                link,
                title,
                published: non_blank(item.pub_date),
                source: non_blank(item.source.map(|s| s.text)),
                summary: item.description,
                guid: non_blank(item.guid.map(|g| g.text)),
            })
        })
        .collect();

    if entries.len() < total {
        debug!(skipped = total - entries.len(), "Skipped items without link or title");
    }
    Ok(entries)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// HTTP client for the Google News RSS search endpoint.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: Client,
    endpoint: String,
    sources: SourcePolicy,
}

impl GoogleNews {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        sources: SourcePolicy,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("amami_news/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            sources,
        })
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_target(&self, target: &str) -> Result<Vec<RawEntry>, FetchError> {
        let url = build_search_url(&self.endpoint, target, &self.sources);
        debug!(%url, "Requesting feed");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %truncate_for_log(&body, 200), "Feed request rejected");
            return Err(format!("HTTP {} for {}", status, target).into());
        }

        let body = response.text().await?;
        let entries = parse_feed(&body)?;
        info!(count = entries.len(), bytes = body.len(), "Fetched feed");
        Ok(entries)
    }
}

impl FeedSource for GoogleNews {
    async fn fetch(&self, target: &str) -> Result<Vec<RawEntry>, FetchError> {
        self.fetch_target(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use axum::{Router, extract::Query, http::StatusCode, routing::get};
    use std::collections::HashMap;

    const FIXTURE: &str = include_str!("../../tests/fixtures/google_news.xml");

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/rss/search", addr)
    }

    #[test]
    fn test_parse_feed_reads_all_fields() {
        let entries = parse_feed(FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "徳之島町で新しい道路が開通 - 奄美新聞");
        assert_eq!(first.link, "https://news.google.com/rss/articles/road-opening?oc=5");
        assert_eq!(first.guid.as_deref(), Some("CBMiroad-opening"));
        assert_eq!(first.source.as_deref(), Some("奄美新聞"));
        assert_eq!(first.published.as_deref(), Some("Sat, 17 Oct 2026 01:30:00 GMT"));
        let summary = first.summary.as_deref().unwrap();
        assert!(summary.starts_with("<a href=\"https://news.google.com/rss/articles/road-opening?oc=5\""));
        assert!(summary.contains("<font color=\"#6f6f6f\">奄美新聞</font>"));
    }

    #[test]
    fn test_parse_feed_optional_fields_absent() {
        let entries = parse_feed(FIXTURE).unwrap();
        let second = &entries[1];
        assert_eq!(second.title, "与論町で花火大会");
        assert_eq!(second.guid, None);
        assert_eq!(second.source, None);
        assert_eq!(second.published, None);
        assert_eq!(second.summary, None);
    }

    #[test]
    fn test_parse_feed_title_text_is_kept_verbatim() {
        let xml = r#"<rss version="2.0"><channel>
            <item><title>徳之島町　闘牛大会　</title><link>https://news.example/a</link></item>
            <item><title>　</title><link>https://news.example/b</link></item>
        </channel></rss>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        // full-width spaces survive; an all-blank title counts as missing
        assert_eq!(entries[0].title, "徳之島町　闘牛大会　");
        assert_eq!(entries[0].link, "https://news.example/a");
    }

    #[test]
    fn test_parse_feed_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>empty</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<html><body>Sorry</body></html>").is_err());
        assert!(parse_feed("not xml at all").is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_restricted_query() {
        let router = Router::new().route(
            "/rss/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let q = params.get("q").cloned().unwrap_or_default();
                assert!(q.starts_with("\"徳之島町\" AND (site:amamishimbun.co.jp"));
                assert_eq!(params.get("hl").map(String::as_str), Some("ja"));
                assert_eq!(params.get("ceid").map(String::as_str), Some("JP:ja"));
                FIXTURE
            }),
        );
        let endpoint = spawn_server(router).await;
        let source = GoogleNews::new(
            &endpoint,
            Duration::from_secs(5),
            Catalog::default().sources,
        )
        .unwrap();

        let entries = source.fetch("徳之島町").await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_an_error() {
        let router = Router::new().route(
            "/rss/search",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let endpoint = spawn_server(router).await;
        let source = GoogleNews::new(
            &endpoint,
            Duration::from_secs(5),
            Catalog::default().sources,
        )
        .unwrap();

        assert!(source.fetch("奄美市").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let router = Router::new().route(
            "/rss/search",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                FIXTURE
            }),
        );
        let endpoint = spawn_server(router).await;
        let source = GoogleNews::new(
            &endpoint,
            Duration::from_millis(200),
            Catalog::default().sources,
        )
        .unwrap();

        assert!(source.fetch("奄美市").await.is_err());
    }
}
