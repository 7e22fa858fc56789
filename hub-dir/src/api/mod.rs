//! HTTP API handlers

mod claims;
mod health;
mod listings;
mod search;

pub use claims::{list_pending_claims, review_claim, start_claim_review, submit_claim};
pub use health::health;
pub use listings::{change_tier, create_listing, get_listing, update_keywords};
pub use search::search_listings;

use crate::error::ApiError;
use axum::http::HeaderMap;
use hub_common::entitlement::ActingRole;

/// Header carrying the caller's role, set by the fronting application
/// after authentication. Absent means an anonymous visitor.
pub const ACTING_ROLE_HEADER: &str = "x-acting-role";

/// Resolve the acting role from request headers
pub(crate) fn acting_role(headers: &HeaderMap) -> Result<ActingRole, ApiError> {
    match headers.get(ACTING_ROLE_HEADER) {
        None => Ok(ActingRole::User),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| ApiError::bad_request("invalid_role", "Unreadable role header"))?;
            value.parse().map_err(|_| {
                ApiError::bad_request("invalid_role", format!("Unknown acting role: {value}"))
            })
        }
    }
}

/// Admin gate for review/dashboard endpoints
pub(crate) fn require_admin(headers: &HeaderMap) -> Result<(), ApiError> {
    if acting_role(headers)? == ActingRole::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin role required"))
    }
}
