//! Entitlement enforcement
//!
//! Single entry point for every listing write path. Content that exceeds the
//! declared tier's limits is rejected, never silently truncated; the caller
//! has to see the data it would have lost.

use crate::listing::{ClaimStatus, ListingDraft, ListingRecord};
use crate::tier::MembershipTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Entitlement violation, recoverable by the caller adjusting input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("Keyword limit exceeded for tier {tier}: limit {limit}, got {actual}")]
    KeywordLimitExceeded {
        tier: MembershipTier,
        limit: usize,
        actual: usize,
    },

    #[error("Photo limit exceeded for tier {tier}: limit {limit}, got {actual}")]
    PhotoLimitExceeded {
        tier: MembershipTier,
        limit: usize,
        actual: usize,
    },

    #[error("Description too long for tier {tier}: limit {limit} chars, got {actual}")]
    DescriptionTooLong {
        tier: MembershipTier,
        limit: usize,
        actual: usize,
    },

    #[error("Tier {tier} cannot post special offers")]
    OffersNotAllowed { tier: MembershipTier },

    #[error("Tier {tier} cannot post events")]
    EventsNotAllowed { tier: MembershipTier },

    /// Self-service tier upgrade attempted before ownership verification
    #[error("Listing ownership must be verified before upgrading to tier {requested}")]
    ClaimRequired { requested: MembershipTier },
}

impl EntitlementError {
    /// Machine-readable kind for the HTTP error envelope
    pub fn kind(&self) -> &'static str {
        match self {
            EntitlementError::KeywordLimitExceeded { .. } => "keyword_limit_exceeded",
            EntitlementError::PhotoLimitExceeded { .. } => "photo_limit_exceeded",
            EntitlementError::DescriptionTooLong { .. } => "description_too_long",
            EntitlementError::OffersNotAllowed { .. } => "offers_not_allowed",
            EntitlementError::EventsNotAllowed { .. } => "events_not_allowed",
            EntitlementError::ClaimRequired { .. } => "claim_required",
        }
    }
}

/// Role of the actor performing a write, supplied by the auth context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActingRole {
    User,
    BusinessOwner,
    Admin,
}

impl ActingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActingRole::User => "user",
            ActingRole::BusinessOwner => "business_owner",
            ActingRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActingRole {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ActingRole::User),
            "business_owner" => Ok(ActingRole::BusinessOwner),
            "admin" => Ok(ActingRole::Admin),
            other => Err(crate::error::Error::UnknownVariant {
                field: "acting_role",
                value: other.to_string(),
            }),
        }
    }
}

/// Validate a draft against its declared tier and produce the record to persist.
///
/// Checks keyword count, photo count, description length, and the offer/event
/// feature gates. Returns the normalized record on success; persistence is the
/// caller's responsibility. Re-validating an already-valid record with the
/// same `now` yields an identical record.
pub fn validate_and_normalize(
    draft: &ListingDraft,
    now: DateTime<Utc>,
) -> Result<ListingRecord, EntitlementError> {
    let tier = draft.membership_tier;
    let policy = tier.policy();

    if draft.keywords.len() > policy.max_keywords {
        return Err(EntitlementError::KeywordLimitExceeded {
            tier,
            limit: policy.max_keywords,
            actual: draft.keywords.len(),
        });
    }

    if draft.photos.len() > policy.max_photos {
        return Err(EntitlementError::PhotoLimitExceeded {
            tier,
            limit: policy.max_photos,
            actual: draft.photos.len(),
        });
    }

    let description_chars = draft.description.chars().count();
    if description_chars > policy.max_description_chars {
        return Err(EntitlementError::DescriptionTooLong {
            tier,
            limit: policy.max_description_chars,
            actual: description_chars,
        });
    }

    if !draft.special_offers.is_empty() && !policy.can_post_offers {
        return Err(EntitlementError::OffersNotAllowed { tier });
    }

    if !draft.events.is_empty() && !policy.can_post_events {
        return Err(EntitlementError::EventsNotAllowed { tier });
    }

    Ok(ListingRecord {
        id: draft.id.unwrap_or_else(Uuid::new_v4),
        name: draft.name.clone(),
        category: draft.category.clone(),
        subcategory: draft.subcategory.clone(),
        address: draft.address.clone(),
        phone: draft.phone.clone(),
        website: draft.website.clone(),
        description: draft.description.clone(),
        membership_tier: tier,
        claim_status: draft.claim_status,
        keywords: draft.keywords.clone(),
        photos: draft.photos.clone(),
        rating: draft.rating,
        special_offers: draft.special_offers.clone(),
        events: draft.events.clone(),
        owner_id: draft.owner_id,
        created_at: now,
        updated_at: now,
    })
}

/// Change a listing's membership tier.
///
/// Self-service upgrades above `Basic` require a verified ownership claim;
/// an admin may override. The returned record is re-checked against the new
/// tier's limits, so a downgrade that would strand over-limit content fails
/// with the same entitlement errors as a direct write.
pub fn upgrade_tier(
    listing: &ListingRecord,
    requested: MembershipTier,
    acting_role: ActingRole,
) -> Result<ListingRecord, EntitlementError> {
    if requested > MembershipTier::Basic
        && listing.claim_status != ClaimStatus::Verified
        && acting_role != ActingRole::Admin
    {
        return Err(EntitlementError::ClaimRequired { requested });
    }

    let mut draft = ListingDraft::from_record(listing);
    draft.membership_tier = requested;
    let updated = validate_and_normalize(&draft, listing.updated_at)?;

    // Audit trail for tier changes lives in the log stream
    info!(
        listing_id = %listing.id,
        from = %listing.membership_tier,
        to = %requested,
        role = %acting_role,
        "membership tier changed"
    );

    Ok(ListingRecord {
        created_at: listing.created_at,
        ..updated
    })
}
