//! Directory listing model

use crate::error::Error;
use crate::tier::MembershipTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ownership claim status of a listing.
///
/// Independent of the membership tier, but gates self-service tier upgrades:
/// only a `Verified` listing may move above `Basic` without an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Unclaimed,
    Pending,
    Verified,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Unclaimed => "unclaimed",
            ClaimStatus::Pending => "pending",
            ClaimStatus::Verified => "verified",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unclaimed" => Ok(ClaimStatus::Unclaimed),
            "pending" => Ok(ClaimStatus::Pending),
            "verified" => Ok(ClaimStatus::Verified),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(Error::UnknownVariant {
                field: "claim_status",
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted business/vendor listing.
///
/// Content fields are bounded by the tier policy; records coming out of the
/// entitlement enforcer always satisfy those bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: String,
    pub membership_tier: MembershipTier,
    pub claim_status: ClaimStatus,
    pub keywords: Vec<String>,
    pub photos: Vec<String>,
    /// Externally sourced rating; never mutated by this subsystem
    pub rating: f64,
    pub special_offers: Vec<String>,
    pub events: Vec<String>,
    /// Owning account; None until a claim is verified
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write-side input for creating or updating a listing.
///
/// Carries the declared tier so the entitlement enforcer can bound the
/// content fields before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    /// Existing listing id for updates; None for a new listing
    pub id: Option<Uuid>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    pub membership_tier: MembershipTier,
    #[serde(default = "ListingDraft::default_claim_status")]
    pub claim_status: ClaimStatus,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub special_offers: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

impl ListingDraft {
    fn default_claim_status() -> ClaimStatus {
        ClaimStatus::Unclaimed
    }

    /// Build a draft from an existing record, for re-validation on update
    pub fn from_record(record: &ListingRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name.clone(),
            category: record.category.clone(),
            subcategory: record.subcategory.clone(),
            address: record.address.clone(),
            phone: record.phone.clone(),
            website: record.website.clone(),
            description: record.description.clone(),
            membership_tier: record.membership_tier,
            claim_status: record.claim_status,
            keywords: record.keywords.clone(),
            photos: record.photos.clone(),
            rating: record.rating,
            special_offers: record.special_offers.clone(),
            events: record.events.clone(),
            owner_id: record.owner_id,
        }
    }
}
