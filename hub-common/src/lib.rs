//! # Handy Hub Common Library
//!
//! Shared code for the Handy Hub directory services including:
//! - Membership tier policy table and ordering
//! - Listing record model and entitlement enforcement
//! - Search scoring and ranking
//! - Claim/verification state machine
//! - Configuration loading

pub mod claim;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod listing;
pub mod search;
pub mod tier;

pub use error::{Error, Result};
pub use tier::{MembershipTier, TierPolicy};
