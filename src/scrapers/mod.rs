//! Aggregator feed sources.
//!
//! A [`FeedSource`] turns one search target (an entity display name) into the
//! raw entries of the aggregator's feed for it. The production source is
//! [`google_news::GoogleNews`]; tests substitute in-memory sources.
//!
//! # Failure Policy
//!
//! A fetch is attempted exactly once. Any failure (transport error, timeout,
//! non-success status, unparseable feed) is returned as a [`FetchError`] and
//! the aggregator logs it and counts the query as empty.

pub mod google_news;

use crate::models::RawEntry;
use std::error::Error;
use std::future::Future;

/// Error returned by a failed fetch.
pub type FetchError = Box<dyn Error + Send + Sync>;

/// Something that can be searched for one target at a time.
pub trait FeedSource {
    /// Fetch and parse the feed for `target`.
    fn fetch(&self, target: &str) -> impl Future<Output = Result<Vec<RawEntry>, FetchError>> + Send;
}
