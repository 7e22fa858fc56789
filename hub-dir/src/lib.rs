//! hub-dir library - Directory service module
//!
//! Serves the Handy Hub business directory: tier-ranked search, entitlement
//! enforced listing writes, and the listing claim/review flow.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod db;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        // Health endpoint
        .route("/health", get(api::health))
        // Directory search
        .route("/search", get(api::search_listings))
        // Listing CRUD (writes pass through the entitlement enforcer)
        .route("/business", post(api::create_listing))
        .route("/business/:id", get(api::get_listing))
        .route("/business/keywords", put(api::update_keywords))
        .route("/business/tier", put(api::change_tier))
        // Claim flow
        .route("/business/claim", post(api::submit_claim))
        .route("/admin/claims", get(api::list_pending_claims))
        .route("/admin/claims/:id/start-review", post(api::start_claim_review))
        .route("/admin/claims/:id/review", post(api::review_claim))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
