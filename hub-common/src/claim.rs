//! Claim/verification state machine
//!
//! Governs how an unclaimed listing transitions to verified ownership:
//! `pending → {verified, rejected}`, with `under_review` as an optional
//! intermediate admin state. Terminal decisions are idempotent under retry.
//! Persistence, including the uniqueness guarantee for active claims, lives
//! at the storage boundary; this module holds the transition rules.

use crate::error::Error;
use crate::listing::{ClaimStatus, ListingRecord};
use crate::tier::MembershipTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Lifecycle state of a single claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimState {
    Pending,
    UnderReview,
    Verified,
    Rejected,
}

impl ClaimState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimState::Pending => "pending",
            ClaimState::UnderReview => "under_review",
            ClaimState::Verified => "verified",
            ClaimState::Rejected => "rejected",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimState::Verified | ClaimState::Rejected)
    }

    /// Active claims block new submissions for the same listing.
    ///
    /// A rejected claim does not: the claimant may try again.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ClaimState::Pending | ClaimState::UnderReview | ClaimState::Verified
        )
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimState::Pending),
            "under_review" => Ok(ClaimState::UnderReview),
            "verified" => Ok(ClaimState::Verified),
            "rejected" => Ok(ClaimState::Rejected),
            other => Err(Error::UnknownVariant {
                field: "claim_state",
                value: other.to_string(),
            }),
        }
    }
}

/// Relationship the claimant asserts to the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimerRole {
    Owner,
    Manager,
    Employee,
}

impl ClaimerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimerRole::Owner => "owner",
            ClaimerRole::Manager => "manager",
            ClaimerRole::Employee => "employee",
        }
    }
}

impl FromStr for ClaimerRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(ClaimerRole::Owner),
            "manager" => Ok(ClaimerRole::Manager),
            "employee" => Ok(ClaimerRole::Employee),
            other => Err(Error::UnknownVariant {
                field: "claimer_role",
                value: other.to_string(),
            }),
        }
    }
}

/// Admin decision on a pending claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Verified,
    Rejected,
}

impl ReviewDecision {
    fn final_state(&self) -> ClaimState {
        match self {
            ReviewDecision::Verified => ClaimState::Verified,
            ReviewDecision::Rejected => ClaimState::Rejected,
        }
    }
}

/// Claim lifecycle violation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// An active claim already exists for the listing; the caller should
    /// query its status rather than retry
    #[error("Listing {listing_id} already has an active claim ({existing})")]
    Duplicate {
        listing_id: Uuid,
        existing: ClaimState,
    },

    /// Attempted transition out of a terminal state with a different outcome
    #[error("Claim {claim_id} cannot move from {from} to {to}")]
    InvalidTransition {
        claim_id: Uuid,
        from: ClaimState,
        to: ClaimState,
    },
}

impl ClaimError {
    pub fn kind(&self) -> &'static str {
        match self {
            ClaimError::Duplicate { .. } => "duplicate_claim",
            ClaimError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

/// A request by a purported business representative to take ownership of
/// a listing. References the listing; does not own it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub claimer_contact: String,
    pub role: ClaimerRole,
    pub verification_docs: Vec<String>,
    pub status: ClaimState,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ClaimRecord {
    /// New claim at submission time, status `pending`
    pub fn new(
        listing_id: Uuid,
        claimer_contact: String,
        role: ClaimerRole,
        verification_docs: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            claimer_contact,
            role,
            verification_docs,
            status: ClaimState::Pending,
            admin_notes: None,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }
}

/// Outcome of applying an admin review to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The decision was applied; listing side effects must follow
    Applied,
    /// The claim was already terminal with the same decision; no-op.
    /// Tolerates at-least-once delivery of admin actions.
    AlreadyDecided,
}

/// Guard a new submission against an existing claim for the same listing.
///
/// Application-level check only; the storage layer's partial unique index on
/// active claims is what actually closes the race between concurrent submits.
pub fn check_no_active_claim(
    listing_id: Uuid,
    existing: Option<&ClaimRecord>,
) -> Result<(), ClaimError> {
    match existing {
        Some(claim) if claim.status.is_active() => Err(ClaimError::Duplicate {
            listing_id,
            existing: claim.status,
        }),
        _ => Ok(()),
    }
}

/// Move a pending claim into active review, so the dashboard shows which
/// submissions an admin has already picked up.
///
/// Idempotent when the claim is already under review; a terminal claim
/// cannot re-enter review.
pub fn start_review(claim: &mut ClaimRecord) -> Result<(), ClaimError> {
    match claim.status {
        ClaimState::Pending => {
            claim.status = ClaimState::UnderReview;
            Ok(())
        }
        ClaimState::UnderReview => Ok(()),
        from => Err(ClaimError::InvalidTransition {
            claim_id: claim.id,
            from,
            to: ClaimState::UnderReview,
        }),
    }
}

/// Apply an admin decision to a claim.
///
/// Valid from `pending` or `under_review`. Re-applying the same decision to
/// a terminal claim returns `AlreadyDecided` without mutating anything; a
/// conflicting decision is an `InvalidTransition` and is logged as a
/// server-side anomaly since no normal admin flow produces it.
pub fn apply_review(
    claim: &mut ClaimRecord,
    decision: ReviewDecision,
    admin_notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ClaimError> {
    let target = decision.final_state();

    if claim.status.is_terminal() {
        if claim.status == target {
            return Ok(ReviewOutcome::AlreadyDecided);
        }
        warn!(
            claim_id = %claim.id,
            from = %claim.status,
            to = %target,
            "conflicting review of a terminal claim"
        );
        return Err(ClaimError::InvalidTransition {
            claim_id: claim.id,
            from: claim.status,
            to: target,
        });
    }

    claim.status = target;
    claim.admin_notes = admin_notes;
    claim.reviewed_at = Some(now);
    Ok(ReviewOutcome::Applied)
}

/// Listing side effects of a verified claim: the listing is marked verified
/// and its membership tier raised to at least `Verified`, never lowered.
/// Owner account linkage happens when the claimant registers with the
/// fronting app; the verified claim is the durable reference until then.
pub fn promote_listing_on_verify(listing: &mut ListingRecord) {
    listing.claim_status = ClaimStatus::Verified;
    if listing.membership_tier < MembershipTier::Verified {
        listing.membership_tier = MembershipTier::Verified;
    }
}
