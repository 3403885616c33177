//! Data models for feed entries, geographic entities and stored articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Entity`] and [`EntityKind`]: Municipalities and islands articles are filed under
//! - [`RawEntry`]: One unprocessed item from the aggregator's RSS feed
//! - [`Article`]: A classified article, the unit returned to callers and persisted
//!
//! [`Article`] keeps the camelCase (and one PascalCase) field names that the
//! existing front-end and `news.json` archive already use, hence the
//! `#[serde(rename)]` attributes.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The granularity of a geographic entity.
///
/// Municipalities are always matched before islands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A town, village or city. Highest classification priority.
    Municipality,
    /// An island. Used only when no municipality keyword matches.
    Island,
}

/// A municipality or island that articles can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entity {
    /// Stable identifier written to `municipalityId`.
    pub id: String,
    /// Display name, also used as the search target.
    pub name: String,
    /// Substrings that identify the entity in a title. Any hit matches.
    pub keywords: Vec<String>,
}

impl Entity {
    pub fn new(id: &str, name: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// True when any keyword is contained in `title`.
    pub fn matches(&self, title: &str) -> bool {
        self.keywords.iter().any(|kw| title.contains(kw.as_str()))
    }
}

/// A single item as it arrives from the aggregator feed.
///
/// Every field except `link` and `title` is optional; the classifier
/// substitutes fallbacks for whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// The article URL.
    pub link: String,
    /// The headline as published.
    pub title: String,
    /// Raw `pubDate` text (RFC 2822 in Google News feeds).
    pub published: Option<String>,
    /// Publisher display name from the `<source>` element.
    pub source: Option<String>,
    /// HTML summary from the `<description>` element, entities already decoded.
    pub summary: Option<String>,
    /// Feed-provided unique identifier.
    pub guid: Option<String>,
}

/// A classified news article.
///
/// Created once by the classifier and never modified afterwards. `url` is the
/// deduplication and merge key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Feed guid, or the URL when the feed gave none.
    pub id: String,
    /// Identifier of the assigned municipality or island.
    #[serde(rename = "municipalityId")]
    pub municipality_id: String,
    /// Display name of the assigned municipality or island.
    #[serde(rename = "MunicipalityName")]
    pub municipality_name: String,
    /// ISO-8601 publish timestamp.
    pub date: String,
    /// The original, unsanitized headline.
    pub title: String,
    /// First 100 characters of the summary followed by `...`.
    pub content: String,
    /// Canonical publisher name.
    pub source: String,
    /// Embedded image from the summary, or a generated placeholder.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    /// Canonical article URL.
    pub url: String,
}

impl Article {
    /// Parse `date` into a UTC instant.
    ///
    /// Accepts RFC 3339 (what this crate writes) and offset-less ISO-8601
    /// timestamps (what older archives contain), the latter read as UTC.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// Sort articles newest first.
///
/// Articles whose date cannot be parsed sort after every dated one.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
}
