//! Listing queries
//!
//! Row mapping parses tier and status strings through their `FromStr`
//! implementations, so a corrupted value surfaces as a data-integrity error
//! instead of being coerced to a default.

use chrono::{DateTime, Utc};
use hub_common::entitlement::{self, ActingRole};
use hub_common::listing::ListingRecord;
use hub_common::tier::MembershipTier;
use hub_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Map a listings row to a record
pub(crate) fn row_to_listing(row: &SqliteRow) -> Result<ListingRecord> {
    let id: String = row.try_get("id")?;
    let tier: String = row.try_get("membership_tier")?;
    let claim_status: String = row.try_get("claim_status")?;
    let keywords: String = row.try_get("keywords")?;
    let photos: String = row.try_get("photos")?;
    let special_offers: String = row.try_get("special_offers")?;
    let events: String = row.try_get("events")?;
    let owner_id: Option<String> = row.try_get("owner_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(ListingRecord {
        id: parse_uuid("listings.id", &id)?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        subcategory: row.try_get("subcategory")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        website: row.try_get("website")?,
        description: row.try_get("description")?,
        membership_tier: tier.parse()?,
        claim_status: claim_status.parse()?,
        keywords: parse_json_list("listings.keywords", &keywords)?,
        photos: parse_json_list("listings.photos", &photos)?,
        rating: row.try_get("rating")?,
        special_offers: parse_json_list("listings.special_offers", &special_offers)?,
        events: parse_json_list("listings.events", &events)?,
        owner_id: owner_id
            .map(|s| parse_uuid("listings.owner_id", &s))
            .transpose()?,
        created_at: parse_timestamp("listings.created_at", &created_at)?,
        updated_at: parse_timestamp("listings.updated_at", &updated_at)?,
    })
}

pub(crate) fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| Error::UnknownVariant {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn parse_json_list(field: &'static str, value: &str) -> Result<Vec<String>> {
    serde_json::from_str(value).map_err(|_| Error::UnknownVariant {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::UnknownVariant {
            field,
            value: value.to_string(),
        })
}

/// Fetch a listing by id
pub async fn get_listing(db: &SqlitePool, id: Uuid) -> Result<Option<ListingRecord>> {
    let row = sqlx::query("SELECT * FROM listings WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?;

    row.as_ref().map(row_to_listing).transpose()
}

/// Fetch all listings in insertion order.
///
/// Search ranking depends on this order for its deterministic tie-break,
/// so the ORDER BY is part of the contract, not a nicety.
pub async fn list_listings(db: &SqlitePool) -> Result<Vec<ListingRecord>> {
    let rows = sqlx::query("SELECT * FROM listings ORDER BY created_at ASC, id ASC")
        .fetch_all(db)
        .await?;

    rows.iter().map(row_to_listing).collect()
}

/// Insert or update a listing.
///
/// Callers must pass records that came out of the entitlement enforcer;
/// this function persists, it does not validate. `created_at` is preserved
/// on update.
pub async fn upsert_listing(db: &SqlitePool, record: &ListingRecord) -> Result<()> {
    sqlx::query(
        "INSERT INTO listings (
            id, name, category, subcategory, address, phone, website,
            description, membership_tier, claim_status, keywords, photos,
            rating, special_offers, events, owner_id, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            category = excluded.category,
            subcategory = excluded.subcategory,
            address = excluded.address,
            phone = excluded.phone,
            website = excluded.website,
            description = excluded.description,
            membership_tier = excluded.membership_tier,
            claim_status = excluded.claim_status,
            keywords = excluded.keywords,
            photos = excluded.photos,
            rating = excluded.rating,
            special_offers = excluded.special_offers,
            events = excluded.events,
            owner_id = excluded.owner_id,
            updated_at = excluded.updated_at",
    )
    .bind(record.id.to_string())
    .bind(&record.name)
    .bind(&record.category)
    .bind(&record.subcategory)
    .bind(&record.address)
    .bind(&record.phone)
    .bind(&record.website)
    .bind(&record.description)
    .bind(record.membership_tier.as_str())
    .bind(record.claim_status.as_str())
    .bind(serde_json::to_string(&record.keywords).unwrap_or_else(|_| "[]".to_string()))
    .bind(serde_json::to_string(&record.photos).unwrap_or_else(|_| "[]".to_string()))
    .bind(record.rating)
    .bind(serde_json::to_string(&record.special_offers).unwrap_or_else(|_| "[]".to_string()))
    .bind(serde_json::to_string(&record.events).unwrap_or_else(|_| "[]".to_string()))
    .bind(record.owner_id.map(|u| u.to_string()))
    .bind(record.created_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

/// Change a listing's membership tier inside a transaction.
///
/// The claim status is re-read under the same transaction as the write, so
/// a claim rejected concurrently with an approved upgrade cannot produce a
/// lost update.
pub async fn change_tier(
    db: &SqlitePool,
    listing_id: Uuid,
    requested: MembershipTier,
    acting_role: ActingRole,
) -> Result<ListingRecord> {
    let mut tx = db.begin().await?;

    let row = sqlx::query("SELECT * FROM listings WHERE id = ?")
        .bind(listing_id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("listing {listing_id}")))?;
    let listing = row_to_listing(&row)?;

    let mut updated = entitlement::upgrade_tier(&listing, requested, acting_role)?;
    updated.updated_at = Utc::now();

    sqlx::query("UPDATE listings SET membership_tier = ?, updated_at = ? WHERE id = ?")
        .bind(updated.membership_tier.as_str())
        .bind(updated.updated_at.to_rfc3339())
        .bind(listing_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(updated)
}
