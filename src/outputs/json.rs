//! JSON archive of collected articles.
//!
//! The archive is a single pretty-printed JSON array of [`Article`] records,
//! UTF-8 with Japanese text written verbatim rather than `\u` escaped, so it
//! stays readable and diffable.
//!
//! # Crash Safety
//!
//! [`save_store`] writes to a sibling temporary file and renames it over the
//! archive, so a crash mid-write leaves the previous archive intact.

use crate::models::Article;
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Default archive location, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "news_data/news.json";

/// Load the archive at `path`.
///
/// A missing file is an empty archive. So is a corrupt one, which is logged;
/// the next save replaces it with a valid archive. Any other read failure is
/// returned so the caller never overwrites an archive it could not read.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_store(path: &Path) -> Result<Vec<Article>, Box<dyn Error + Send + Sync>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No existing archive; starting fresh");
            return Ok(Vec::new());
        }
        Err(e) => {
            error!(error = %e, "Existing archive unreadable");
            return Err(e.into());
        }
    };

    match serde_json::from_slice::<Vec<Article>>(&bytes) {
        Ok(articles) => {
            info!(count = articles.len(), "Loaded existing articles");
            Ok(articles)
        }
        Err(e) => {
            warn!(error = %e, "Existing archive was corrupted; starting fresh");
            Ok(Vec::new())
        }
    }
}

/// Write `articles` to `path`, replacing the previous archive atomically.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn save_store(path: &Path, articles: &[Article]) -> Result<(), Box<dyn Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    info!("Wrote archive");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "news.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
