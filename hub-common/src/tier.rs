//! Membership tier policy table
//!
//! Maps each membership tier to its entitlements: content limits, feature
//! flags, and the search ranking boost. The table is static; everything a
//! tier permits is answered here so enforcement and scoring stay consistent.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Membership tier for a directory listing.
///
/// Ordered: `Basic < Verified < Premium < Elite`. Premium is marketed as
/// "silver" and Elite as "gold"; the store always uses the canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    Basic,
    Verified,
    Premium,
    Elite,
}

impl MembershipTier {
    /// Canonical string form, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Basic => "basic",
            MembershipTier::Verified => "verified",
            MembershipTier::Premium => "premium",
            MembershipTier::Elite => "elite",
        }
    }

    /// Entitlements for this tier
    ///
    /// Exhaustive over the enum; a tier that parsed always has a policy.
    pub fn policy(&self) -> &'static TierPolicy {
        match self {
            MembershipTier::Basic => &BASIC_POLICY,
            MembershipTier::Verified => &VERIFIED_POLICY,
            MembershipTier::Premium => &PREMIUM_POLICY,
            MembershipTier::Elite => &ELITE_POLICY,
        }
    }

    /// All tiers in ascending order
    pub fn all() -> [MembershipTier; 4] {
        [
            MembershipTier::Basic,
            MembershipTier::Verified,
            MembershipTier::Premium,
            MembershipTier::Elite,
        ]
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipTier {
    type Err = Error;

    /// Parse a stored tier value.
    ///
    /// Accepts the marketing aliases ("silver", "gold") seen in imported
    /// data. Anything else is a data-integrity error, not a user error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(MembershipTier::Basic),
            "verified" => Ok(MembershipTier::Verified),
            "premium" | "silver" => Ok(MembershipTier::Premium),
            "elite" | "gold" => Ok(MembershipTier::Elite),
            other => Err(Error::UnknownVariant {
                field: "membership_tier",
                value: other.to_string(),
            }),
        }
    }
}

/// Entitlements attached to a membership tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierPolicy {
    /// Maximum number of photos on the listing
    pub max_photos: usize,
    /// Maximum number of search keywords on the listing
    pub max_keywords: usize,
    /// Maximum description length in characters
    pub max_description_chars: usize,
    /// Additive score applied to every listing of this tier during search
    pub ranking_boost: i64,
    /// Listing may publish special offers
    pub can_post_offers: bool,
    /// Listing may publish events
    pub can_post_events: bool,
    /// Owner dashboard shows analytics
    pub show_analytics: bool,
}

static BASIC_POLICY: TierPolicy = TierPolicy {
    max_photos: 2,
    max_keywords: 3,
    max_description_chars: 300,
    ranking_boost: 0,
    can_post_offers: false,
    can_post_events: false,
    show_analytics: false,
};

static VERIFIED_POLICY: TierPolicy = TierPolicy {
    max_photos: 5,
    max_keywords: 5,
    max_description_chars: 600,
    ranking_boost: 10,
    can_post_offers: false,
    can_post_events: false,
    show_analytics: false,
};

static PREMIUM_POLICY: TierPolicy = TierPolicy {
    max_photos: 10,
    max_keywords: 10,
    max_description_chars: 1200,
    ranking_boost: 15,
    can_post_offers: true,
    can_post_events: true,
    show_analytics: false,
};

static ELITE_POLICY: TierPolicy = TierPolicy {
    max_photos: 25,
    max_keywords: 20,
    max_description_chars: 2500,
    ranking_boost: 20,
    can_post_offers: true,
    can_post_events: true,
    show_analytics: true,
};
