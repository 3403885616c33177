//! Utility functions for text truncation, feed field extraction and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Summary and log truncation
//! - Feed date parsing with documented fallback
//! - Image URL extraction from summary HTML
//! - File system validation for the archive directory

use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Number of summary characters kept in [`crate::models::Article::content`].
pub const SUMMARY_CHARS: usize = 100;

static IMG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// First [`SUMMARY_CHARS`] characters of `summary` followed by `...`.
///
/// The marker is appended even when nothing was cut.
pub fn truncate_summary(summary: &str) -> String {
    let head: String = summary.chars().take(SUMMARY_CHARS).collect();
    format!("{}...", head)
}

/// The first `src="..."` attribute value in an HTML fragment.
pub fn extract_image_src(html: &str) -> Option<&str> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Placeholder thumbnail labelled with the first two characters of `name`.
pub fn placeholder_image(name: &str) -> String {
    let label: String = name.chars().take(2).collect();
    format!("https://placehold.co/100x70/0099c6/FFF?text={}", label)
}

/// Parse a feed timestamp, falling back to `now` when it is absent or unreadable.
///
/// RSS dates are RFC 2822; RFC 3339 is accepted as well. A weekday that does
/// not agree with the date is ignored rather than voiding the whole timestamp.
pub fn parse_feed_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.map(str::trim)
        .and_then(|s| parse_rfc2822_lenient(s).or_else(|| DateTime::parse_from_rfc3339(s).ok()))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

fn parse_rfc2822_lenient(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(s).ok().or_else(|| {
        let (_weekday, rest) = s.split_once(',')?;
        DateTime::parse_from_rfc2822(rest.trim()).ok()
    })
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch = path.join("..__write_check__");
    stdfs::File::create(&scratch)?;
    let _ = stdfs::remove_file(&scratch);
    info!("Archive directory is writable");
    Ok(())
}
