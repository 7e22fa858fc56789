//! Directory search endpoint

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use hub_common::search::{self, ScoredListing};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Query parameters for directory search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text query; empty or all-short tokens falls back to tier ordering
    #[serde(default)]
    pub q: String,

    /// Category filter; omitted or "all" disables filtering
    pub category: Option<String>,

    /// Maximum number of results; omitted or 0 returns everything
    pub limit: Option<usize>,
}

/// Search response with ranked results
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub category: Option<String>,
    pub total_results: usize,
    pub results: Vec<ScoredListing>,
}

/// GET /search?q=&category=&limit=
///
/// Ranks the whole directory for the query: keyword/name/description
/// matches plus the membership tier's visibility boost, ties broken by
/// rating then insertion order. The limit is applied after ranking.
pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let listings = db::listings::list_listings(&state.db).await?;

    let mut results = search::search(&query.q, query.category.as_deref(), &listings);
    let total_results = results.len();

    if let Some(limit) = query.limit {
        if limit > 0 {
            results.truncate(limit);
        }
    }

    debug!(
        q = %query.q,
        total = total_results,
        returned = results.len(),
        "directory search"
    );

    Ok(Json(SearchResponse {
        query: query.q,
        category: query.category,
        total_results,
        results,
    }))
}
