//! Storage-level tests for the claim uniqueness constraint and the
//! transactional behavior of reviews and tier changes.

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use hub_common::claim::{ClaimError, ClaimRecord, ClaimState, ClaimerRole, ReviewDecision};
use hub_common::entitlement::{validate_and_normalize, ActingRole, EntitlementError};
use hub_common::listing::{ClaimStatus, ListingDraft, ListingRecord};
use hub_common::tier::MembershipTier;
use hub_common::Error;
use hub_dir::db;

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Failed to enable foreign keys");

    db::create_schema(&pool).await.expect("Failed to create schema");
    pool
}

async fn seed_listing(pool: &SqlitePool, tier: MembershipTier) -> ListingRecord {
    let draft = ListingDraft {
        id: None,
        name: "Boerne Bakery".to_string(),
        category: "restaurants".to_string(),
        subcategory: None,
        address: Some("100 Main St".to_string()),
        phone: None,
        website: None,
        description: "Fresh sourdough daily".to_string(),
        membership_tier: tier,
        claim_status: ClaimStatus::Unclaimed,
        keywords: vec!["bakery".to_string()],
        photos: vec![],
        rating: 4.6,
        special_offers: vec![],
        events: vec![],
        owner_id: None,
    };
    let record = validate_and_normalize(&draft, Utc::now()).unwrap();
    db::listings::upsert_listing(pool, &record).await.unwrap();
    record
}

fn claim_for(listing_id: Uuid) -> ClaimRecord {
    ClaimRecord::new(
        listing_id,
        "owner@example.com".to_string(),
        ClaimerRole::Owner,
        vec![],
    )
}

#[tokio::test]
async fn test_listing_roundtrip_preserves_json_columns() {
    let pool = setup_pool().await;

    let mut record = seed_listing(&pool, MembershipTier::Premium).await;
    record.special_offers = vec!["two kolaches for one".to_string()];
    record.photos = vec!["front.jpg".to_string(), "counter.jpg".to_string()];
    db::listings::upsert_listing(&pool, &record).await.unwrap();

    let loaded = db::listings::get_listing(&pool, record.id)
        .await
        .unwrap()
        .expect("listing missing");
    assert_eq!(loaded.keywords, record.keywords);
    assert_eq!(loaded.photos, record.photos);
    assert_eq!(loaded.special_offers, record.special_offers);
    assert_eq!(loaded.membership_tier, MembershipTier::Premium);
}

#[tokio::test]
async fn test_unique_index_blocks_second_active_claim() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Basic).await;

    db::claims::insert_claim(&pool, &claim_for(listing.id))
        .await
        .unwrap();

    // Straight to the store, skipping the application-level check: the
    // partial unique index must still reject the duplicate
    let err = db::claims::insert_claim(&pool, &claim_for(listing.id))
        .await
        .unwrap_err();
    match err {
        Error::Claim(ClaimError::Duplicate { listing_id, existing }) => {
            assert_eq!(listing_id, listing.id);
            assert_eq!(existing, ClaimState::Pending);
        }
        other => panic!("expected Duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_submissions_exactly_one_wins() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Basic).await;

    let first_claim = claim_for(listing.id);
    let second_claim = claim_for(listing.id);
    let first = db::claims::insert_claim(&pool, &first_claim);
    let second = db::claims::insert_claim(&pool, &second_claim);
    let (a, b) = tokio::join!(first, second);

    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one concurrent claim may win: {a:?} / {b:?}"
    );
}

#[tokio::test]
async fn test_rejection_frees_the_slot() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Basic).await;

    let first = claim_for(listing.id);
    db::claims::insert_claim(&pool, &first).await.unwrap();
    db::claims::mark_listing_pending(&pool, listing.id)
        .await
        .unwrap();

    db::claims::review_claim(&pool, first.id, ReviewDecision::Rejected, None)
        .await
        .unwrap();

    // Listing released for a fresh claim
    let loaded = db::listings::get_listing(&pool, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.claim_status, ClaimStatus::Rejected);

    db::claims::insert_claim(&pool, &claim_for(listing.id))
        .await
        .expect("resubmission after rejection must pass the unique index");
}

#[tokio::test]
async fn test_verification_promotes_listing_in_same_transaction() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Basic).await;

    let claim = claim_for(listing.id);
    db::claims::insert_claim(&pool, &claim).await.unwrap();
    db::claims::mark_listing_pending(&pool, listing.id)
        .await
        .unwrap();

    let reviewed = db::claims::review_claim(
        &pool,
        claim.id,
        ReviewDecision::Verified,
        Some("docs check out".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(reviewed.status, ClaimState::Verified);
    assert!(reviewed.reviewed_at.is_some());

    let loaded = db::listings::get_listing(&pool, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.claim_status, ClaimStatus::Verified);
    assert_eq!(loaded.membership_tier, MembershipTier::Verified);
}

#[tokio::test]
async fn test_verification_never_downgrades_tier() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Premium).await;

    let claim = claim_for(listing.id);
    db::claims::insert_claim(&pool, &claim).await.unwrap();
    db::claims::review_claim(&pool, claim.id, ReviewDecision::Verified, None)
        .await
        .unwrap();

    let loaded = db::listings::get_listing(&pool, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.membership_tier, MembershipTier::Premium);
}

#[tokio::test]
async fn test_tier_change_rereads_claim_status() {
    let pool = setup_pool().await;
    let listing = seed_listing(&pool, MembershipTier::Basic).await;

    let claim = claim_for(listing.id);
    db::claims::insert_claim(&pool, &claim).await.unwrap();
    db::claims::mark_listing_pending(&pool, listing.id)
        .await
        .unwrap();

    // Claim rejected before the upgrade lands: the transactional re-read
    // must see the rejection and refuse the self-service upgrade
    db::claims::review_claim(&pool, claim.id, ReviewDecision::Rejected, None)
        .await
        .unwrap();

    let err = db::listings::change_tier(
        &pool,
        listing.id,
        MembershipTier::Premium,
        ActingRole::BusinessOwner,
    )
    .await
    .unwrap_err();
    match err {
        Error::Entitlement(EntitlementError::ClaimRequired { requested }) => {
            assert_eq!(requested, MembershipTier::Premium);
        }
        other => panic!("expected ClaimRequired, got {other:?}"),
    }
}

#[tokio::test]
async fn test_tier_change_missing_listing_is_not_found() {
    let pool = setup_pool().await;

    let err = db::listings::change_tier(
        &pool,
        Uuid::new_v4(),
        MembershipTier::Verified,
        ActingRole::Admin,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
