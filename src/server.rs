//! HTTP surface for the on-demand path.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /health` | `ok` |
//! | `GET /api/news` | JSON array of freshly aggregated articles, newest first |
//!
//! `/api/news` runs one full aggregation per request and always answers
//! `200`; failing queries only shrink the list.

use crate::aggregate::collect_latest;
use crate::catalog::Catalog;
use crate::models::Article;
use crate::scrapers::FeedSource;
use axum::{Json, Router, extract::State, routing::get};
use std::error::Error;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

/// Shared, read-only state for every request.
pub struct AppState<S> {
    pub source: Arc<S>,
    pub catalog: Arc<Catalog>,
    pub concurrency: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            catalog: Arc::clone(&self.catalog),
            concurrency: self.concurrency,
        }
    }
}

pub fn router<S>(state: AppState<S>) -> Router
where
    S: FeedSource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(news::<S>))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[instrument(level = "info", skip_all)]
async fn news<S>(State(state): State<AppState<S>>) -> Json<Vec<Article>>
where
    S: FeedSource + Send + Sync + 'static,
{
    let report = collect_latest(state.source.as_ref(), &state.catalog, state.concurrency).await;
    info!(count = report.articles.len(), "Serving on-demand news");
    Json(report.articles)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve<S>(addr: &str, state: AppState<S>) -> Result<(), Box<dyn Error + Send + Sync>>
where
    S: FeedSource + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
