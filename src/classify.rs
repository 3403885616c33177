//! Article classification: filtering and geographic assignment of feed entries.
//!
//! [`Classifier::classify`] turns one [`RawEntry`] into an [`Article`] or a
//! [`Rejection`]. The steps run in a fixed order and the filters stop at the
//! first failure:
//!
//! 1. **Recency**: entries older than [`MAX_AGE_DAYS`] are dropped
//! 2. **Block keywords**: titles containing any block keyword are dropped
//! 3. **Source whitelist**: the (normalized) publisher must be accepted
//! 4. **Title sanitization**: publisher brand strings are removed from a
//!    matching copy of the title; the original title is kept for display
//! 5. **Entity assignment**: the first municipality whose keywords hit the
//!    sanitized title wins; islands are tried only if no municipality hits,
//!    and an entry matching neither is dropped
//! 6. **Field synthesis**: id, date, truncated summary and image URL are
//!    filled in, with fallbacks for missing fields
//!
//! Missing optional fields never cause a rejection; they fall back to
//! documented defaults.

use crate::catalog::Catalog;
use crate::models::{Article, Entity, EntityKind, RawEntry};
use crate::utils::{extract_image_src, parse_feed_date, placeholder_image, truncate_summary};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Entries older than this many whole days are not collected.
pub const MAX_AGE_DAYS: i64 = 365;

/// Source name used when a feed item carries no `<source>` element.
pub const FALLBACK_SOURCE: &str = "Google News";

/// Why an entry was not turned into an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    TooOld,
    Blocked,
    UnknownSource,
    NoEntity,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::TooOld => "too old",
            Rejection::Blocked => "blocked keyword",
            Rejection::UnknownSource => "source not allowed",
            Rejection::NoEntity => "no municipality or island",
        };
        f.write_str(reason)
    }
}

/// Applies a [`Catalog`] to raw feed entries.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    catalog: &'a Catalog,
}

impl<'a> Classifier<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Classify one entry as of the run timestamp `now`.
    pub fn classify(&self, entry: &RawEntry, now: DateTime<Utc>) -> Result<Article, Rejection> {
        let published = parse_feed_date(entry.published.as_deref(), now);
        if (now - published).num_days() > MAX_AGE_DAYS {
            return Err(Rejection::TooOld);
        }

        if self.catalog.is_blocked(&entry.title) {
            return Err(Rejection::Blocked);
        }

        let policy = &self.catalog.sources;
        let source = policy.normalize(entry.source.as_deref().unwrap_or(FALLBACK_SOURCE));
        if !policy.is_accepted(source) {
            return Err(Rejection::UnknownSource);
        }

        let match_title = policy.sanitize_title(&entry.title);
        let entity = self.assign(&match_title).ok_or(Rejection::NoEntity)?;

        let summary = entry.summary.as_deref().unwrap_or_default();
        let image_url = extract_image_src(summary)
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_image(&entity.name));

        Ok(Article {
            id: entry.guid.clone().unwrap_or_else(|| entry.link.clone()),
            municipality_id: entity.id.clone(),
            municipality_name: entity.name.clone(),
            date: published.to_rfc3339_opts(SecondsFormat::Secs, true),
            title: entry.title.clone(),
            content: truncate_summary(summary),
            source: source.to_string(),
            image_url,
            url: entry.link.clone(),
        })
    }

    /// First municipality hit, else first island hit.
    pub fn assign(&self, title: &str) -> Option<&'a Entity> {
        [EntityKind::Municipality, EntityKind::Island]
            .into_iter()
            .find_map(|kind| self.catalog.entities(kind).iter().find(|e| e.matches(title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap()
    }

    fn entry(title: &str, source: Option<&str>, age: Duration) -> RawEntry {
        RawEntry {
            link: "https://news.example/article/1".to_string(),
            title: title.to_string(),
            published: Some((now() - age).to_rfc2822()),
            source: source.map(str::to_string),
            summary: None,
            guid: None,
        }
    }

    #[test]
    fn test_tokunoshima_town_scenario() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let e = entry("徳之島町で新しい道路が開通", Some("奄美新聞"), Duration::days(1));
        let a = c.classify(&e, now()).unwrap();
        assert_eq!(a.municipality_id, "tokunoshima");
        assert_eq!(a.municipality_name, "徳之島町");
        assert_eq!(a.source, "奄美新聞");
        assert_eq!(a.title, "徳之島町で新しい道路が開通");
        assert_eq!(a.date, "2026-10-17T03:00:00Z");
    }

    #[test]
    fn test_municipality_beats_island() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        assert_eq!(c.assign("徳之島町と徳之島").unwrap().id, "tokunoshima");
        assert_eq!(c.assign("徳之島の海").unwrap().id, "tokuno_shima");
        assert_eq!(c.assign("奄美大島と与論町").unwrap().id, "yoron");
    }

    #[test]
    fn test_first_configured_match_wins() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        // both match; 奄美市 is configured before 龍郷町
        assert_eq!(c.assign("龍郷町と奄美市の連携").unwrap().id, "amami");
        // 奄美 falls through to the generic island
        assert_eq!(c.assign("奄美の自然").unwrap().id, "amami_oshima");
    }

    #[test]
    fn test_brand_name_alone_is_rejected() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let e = entry(
            "奄美群島南三島経済新聞",
            Some("奄美群島南三島経済新聞"),
            Duration::hours(2),
        );
        assert_eq!(c.classify(&e, now()), Err(Rejection::NoEntity));
    }

    #[test]
    fn test_brand_stripping_still_matches_real_keyword() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let e = entry(
            "伊仙町に新カフェ - 奄美群島南三島経済新聞",
            Some("奄美群島南三島経済新聞"),
            Duration::hours(2),
        );
        let a = c.classify(&e, now()).unwrap();
        assert_eq!(a.municipality_id, "isen");
        assert_eq!(a.title, "伊仙町に新カフェ - 奄美群島南三島経済新聞");
    }

    #[test]
    fn test_block_keyword_excludes() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let tag = entry("奄美市 タグ", Some("奄美新聞"), Duration::days(1));
        assert_eq!(c.classify(&tag, now()), Err(Rejection::Blocked));
        let roundup = entry("奄美群島南三島経済新聞 特集まとめ", Some("奄美新聞"), Duration::days(1));
        assert_eq!(c.classify(&roundup, now()), Err(Rejection::Blocked));
    }

    #[test]
    fn test_recency_boundary() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let old = entry("奄美市の話題", Some("奄美新聞"), Duration::days(400));
        assert_eq!(c.classify(&old, now()), Err(Rejection::TooOld));
        let edge = entry("奄美市の話題", Some("奄美新聞"), Duration::days(365) + Duration::hours(23));
        assert!(c.classify(&edge, now()).is_ok());
        let over = entry("奄美市の話題", Some("奄美新聞"), Duration::days(366));
        assert_eq!(c.classify(&over, now()), Err(Rejection::TooOld));
    }

    #[test]
    fn test_stale_entry_with_mismatched_weekday_is_too_old() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let mut e = entry("奄美市の話題", Some("奄美新聞"), Duration::days(1));
        // 2024-01-01 was a Monday
        e.published = Some("Tue, 01 Jan 2024 00:00:00 GMT".to_string());
        assert_eq!(c.classify(&e, now()), Err(Rejection::TooOld));
    }

    #[test]
    fn test_source_rules() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let missing = entry("奄美市の話題", None, Duration::days(1));
        assert_eq!(c.classify(&missing, now()), Err(Rejection::UnknownSource));
        let other = entry("奄美市の話題", Some("全国新聞"), Duration::days(1));
        assert_eq!(c.classify(&other, now()), Err(Rejection::UnknownSource));
        let alias = entry("奄美市の話題", Some("琉球新報デジタル"), Duration::days(1));
        assert_eq!(c.classify(&alias, now()).unwrap().source, "琉球新報");
    }

    #[test]
    fn test_fallback_fields() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let mut e = entry("加計呂麻の浜", Some("南海日日新聞"), Duration::days(1));
        e.published = None;
        let a = c.classify(&e, now()).unwrap();
        assert_eq!(a.id, e.link);
        assert_eq!(a.content, "...");
        assert_eq!(a.image_url, "https://placehold.co/100x70/0099c6/FFF?text=加計");
        assert_eq!(a.date, "2026-10-18T03:00:00Z");
    }

    #[test]
    fn test_summary_and_image_from_html() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let mut e = entry("和泊町の祭り", Some("南日本新聞"), Duration::days(1));
        let html = format!(
            r#"<p>{}</p><img src="https://img.example/wadomari.jpg">"#,
            "あ".repeat(120)
        );
        e.summary = Some(html.clone());
        e.guid = Some("guid-1".to_string());
        let a = c.classify(&e, now()).unwrap();
        assert_eq!(a.id, "guid-1");
        assert_eq!(a.image_url, "https://img.example/wadomari.jpg");
        assert_eq!(a.content, format!("{}...", html.chars().take(100).collect::<String>()));
    }

    #[test]
    fn test_no_geography_is_rejected() {
        let catalog = Catalog::default();
        let c = Classifier::new(&catalog);
        let e = entry("鹿児島市で会議", Some("南日本新聞"), Duration::days(1));
        assert_eq!(c.classify(&e, now()), Err(Rejection::NoEntity));
    }
}
