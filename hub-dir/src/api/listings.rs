//! Listing write and read endpoints
//!
//! Every write path goes through the entitlement enforcer before anything
//! is persisted; there is no route that can store over-limit content.

use crate::db;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use hub_common::entitlement::{self, ActingRole, EntitlementError};
use hub_common::listing::{ClaimStatus, ListingDraft, ListingRecord};
use hub_common::tier::MembershipTier;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// POST /business - Create a listing
///
/// The declared tier and claim status are honored only for admins (directory
/// imports and seeded data). Everyone else starts unclaimed at basic until
/// ownership is verified: a verified status only ever comes out of the claim
/// review flow, never from the request body.
pub async fn create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut draft): Json<ListingDraft>,
) -> Result<(StatusCode, Json<ListingRecord>), ApiError> {
    let role = super::acting_role(&headers)?;

    if role != ActingRole::Admin {
        draft.claim_status = ClaimStatus::Unclaimed;
        draft.owner_id = None;

        if draft.membership_tier > MembershipTier::Basic {
            return Err(EntitlementError::ClaimRequired {
                requested: draft.membership_tier,
            }
            .into());
        }
    }

    let record = entitlement::validate_and_normalize(&draft, Utc::now())?;
    db::listings::upsert_listing(&state.db, &record).await?;

    info!(listing_id = %record.id, name = %record.name, "listing created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /business/:id - Fetch a single listing
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingRecord>, ApiError> {
    let listing = db::listings::get_listing(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("listing {id}")))?;

    Ok(Json(listing))
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub business_id: Uuid,
    pub keywords: Vec<String>,
}

/// PUT /business/keywords - Replace a listing's search keywords
///
/// Responds 400 with the entitlement detail when the keyword count exceeds
/// the tier limit; the stored record is untouched in that case.
pub async fn update_keywords(
    State(state): State<AppState>,
    Json(req): Json<KeywordsRequest>,
) -> Result<Json<ListingRecord>, ApiError> {
    let listing = db::listings::get_listing(&state.db, req.business_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("listing {}", req.business_id)))?;

    let mut draft = ListingDraft::from_record(&listing);
    draft.keywords = req.keywords;

    let mut updated = entitlement::validate_and_normalize(&draft, Utc::now())?;
    updated.created_at = listing.created_at;
    db::listings::upsert_listing(&state.db, &updated).await?;

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub business_id: Uuid,
    pub requested_tier: MembershipTier,
}

/// PUT /business/tier - Change a listing's membership tier
///
/// Self-service upgrades require a verified claim; admins may override.
/// The claim status is checked transactionally with the write.
pub async fn change_tier(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TierRequest>,
) -> Result<Json<ListingRecord>, ApiError> {
    let role = super::acting_role(&headers)?;

    let updated =
        db::listings::change_tier(&state.db, req.business_id, req.requested_tier, role).await?;

    Ok(Json(updated))
}
