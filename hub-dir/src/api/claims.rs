//! Claim submission and admin review endpoints

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use hub_common::claim::{self, ClaimRecord, ClaimerRole, ReviewDecision};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub listing_id: Uuid,
    pub claimer_contact: String,
    pub role: ClaimerRole,
    #[serde(default)]
    pub verification_docs: Vec<String>,
}

/// POST /business/claim - Submit an ownership claim
///
/// Responds 409 when an active claim already exists. The pre-insert check
/// gives that answer with the blocking claim's status; the partial unique
/// index gives the same answer to whichever of two concurrent submissions
/// loses the race.
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<ClaimRecord>), ApiError> {
    let listing = db::listings::get_listing(&state.db, req.listing_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("listing {}", req.listing_id)))?;

    let existing = db::claims::get_active_claim(&state.db, req.listing_id).await?;
    claim::check_no_active_claim(req.listing_id, existing.as_ref())?;

    let record = ClaimRecord::new(
        req.listing_id,
        req.claimer_contact,
        req.role,
        req.verification_docs,
    );
    db::claims::insert_claim(&state.db, &record).await?;
    db::claims::mark_listing_pending(&state.db, req.listing_id).await?;

    info!(
        claim_id = %record.id,
        listing_id = %req.listing_id,
        listing = %listing.name,
        "ownership claim submitted"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Serialize)]
pub struct PendingClaimsResponse {
    pub total: usize,
    pub claims: Vec<ClaimRecord>,
}

/// GET /admin/claims - Claims awaiting review, oldest first
pub async fn list_pending_claims(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PendingClaimsResponse>, ApiError> {
    super::require_admin(&headers)?;

    let claims = db::claims::list_pending_claims(&state.db).await?;
    Ok(Json(PendingClaimsResponse {
        total: claims.len(),
        claims,
    }))
}

/// POST /admin/claims/:id/start-review - Pick up a pending claim
///
/// Marks the claim under review so other admins see it is taken. Repeating
/// the call is a no-op; a decided claim responds 409.
pub async fn start_claim_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(claim_id): Path<Uuid>,
) -> Result<Json<ClaimRecord>, ApiError> {
    super::require_admin(&headers)?;

    let claim = db::claims::start_review(&state.db, claim_id).await?;

    info!(claim_id = %claim.id, "claim review started");
    Ok(Json(claim))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// POST /admin/claims/:id/review - Decide a pending claim
///
/// Verification marks the listing verified and raises its tier to at least
/// "verified" in the same transaction. Retrying a decision that already
/// stuck returns 200 with the stored claim.
pub async fn review_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(claim_id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ClaimRecord>, ApiError> {
    super::require_admin(&headers)?;

    let claim =
        db::claims::review_claim(&state.db, claim_id, req.decision, req.admin_notes).await?;

    info!(claim_id = %claim.id, status = %claim.status, "claim reviewed");
    Ok(Json(claim))
}
