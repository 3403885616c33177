//! Persistence of the article archive.
//!
//! # Submodules
//!
//! - [`json`]: Loads and atomically rewrites the `news.json` archive
//!
//! # Output Structure
//!
//! ```text
//! news_data/
//! └── news.json   # every collected article, newest first
//! ```

pub mod json;
