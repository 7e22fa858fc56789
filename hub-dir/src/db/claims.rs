//! Claim queries
//!
//! Claim uniqueness is enforced by the partial unique index on active
//! claims; inserts that lose the race surface as `ClaimError::Duplicate`
//! regardless of what an earlier application-level check saw.

use super::listings::{parse_json_list, parse_timestamp, parse_uuid, row_to_listing};
use chrono::Utc;
use hub_common::claim::{self, ClaimError, ClaimRecord, ReviewDecision, ReviewOutcome};
use hub_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Map a claims row to a record
fn row_to_claim(row: &SqliteRow) -> Result<ClaimRecord> {
    let id: String = row.try_get("id")?;
    let listing_id: String = row.try_get("listing_id")?;
    let role: String = row.try_get("role")?;
    let docs: String = row.try_get("verification_docs")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let reviewed_at: Option<String> = row.try_get("reviewed_at")?;

    Ok(ClaimRecord {
        id: parse_uuid("claims.id", &id)?,
        listing_id: parse_uuid("claims.listing_id", &listing_id)?,
        claimer_contact: row.try_get("claimer_contact")?,
        role: role.parse()?,
        verification_docs: parse_json_list("claims.verification_docs", &docs)?,
        status: status.parse()?,
        admin_notes: row.try_get("admin_notes")?,
        created_at: parse_timestamp("claims.created_at", &created_at)?,
        reviewed_at: reviewed_at
            .map(|s| parse_timestamp("claims.reviewed_at", &s))
            .transpose()?,
    })
}

/// Fetch a claim by id
pub async fn get_claim(db: &SqlitePool, id: Uuid) -> Result<Option<ClaimRecord>> {
    let row = sqlx::query("SELECT * FROM claims WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?;

    row.as_ref().map(row_to_claim).transpose()
}

/// Fetch the active claim for a listing, if any
pub async fn get_active_claim(db: &SqlitePool, listing_id: Uuid) -> Result<Option<ClaimRecord>> {
    let row = sqlx::query(
        "SELECT * FROM claims
         WHERE listing_id = ? AND status IN ('pending', 'under_review', 'verified')",
    )
    .bind(listing_id.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(row_to_claim).transpose()
}

/// List claims awaiting review, oldest first (admin dashboard)
pub async fn list_pending_claims(db: &SqlitePool) -> Result<Vec<ClaimRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM claims
         WHERE status IN ('pending', 'under_review')
         ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_claim).collect()
}

/// Insert a new claim.
///
/// A unique-index violation means another active claim exists (possibly
/// inserted concurrently); it is reported as `ClaimError::Duplicate` with
/// the blocking claim's status when it can still be read.
pub async fn insert_claim(db: &SqlitePool, claim: &ClaimRecord) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO claims (
            id, listing_id, claimer_contact, role, verification_docs,
            status, admin_notes, created_at, reviewed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(claim.id.to_string())
    .bind(claim.listing_id.to_string())
    .bind(&claim.claimer_contact)
    .bind(claim.role.as_str())
    .bind(serde_json::to_string(&claim.verification_docs).unwrap_or_else(|_| "[]".to_string()))
    .bind(claim.status.as_str())
    .bind(&claim.admin_notes)
    .bind(claim.created_at.to_rfc3339())
    .bind(claim.reviewed_at.map(|t| t.to_rfc3339()))
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            let existing = get_active_claim(db, claim.listing_id)
                .await?
                .map(|c| c.status)
                .unwrap_or(hub_common::claim::ClaimState::Pending);
            Err(Error::Claim(ClaimError::Duplicate {
                listing_id: claim.listing_id,
                existing,
            }))
        }
        Err(e) => Err(e.into()),
    }
}

/// Move a pending claim into active review
pub async fn start_review(db: &SqlitePool, claim_id: Uuid) -> Result<ClaimRecord> {
    let mut tx = db.begin().await?;

    let row = sqlx::query("SELECT * FROM claims WHERE id = ?")
        .bind(claim_id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {claim_id}")))?;
    let mut claim = row_to_claim(&row)?;

    claim::start_review(&mut claim)?;

    sqlx::query("UPDATE claims SET status = ? WHERE id = ?")
        .bind(claim.status.as_str())
        .bind(claim.id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(claim)
}

/// Apply an admin review decision to a claim.
///
/// Runs in a transaction so the claim update and the listing side effects
/// of a verification commit together. Idempotent: retrying a decision that
/// already stuck returns the stored claim unchanged.
pub async fn review_claim(
    db: &SqlitePool,
    claim_id: Uuid,
    decision: ReviewDecision,
    admin_notes: Option<String>,
) -> Result<ClaimRecord> {
    let mut tx = db.begin().await?;

    let row = sqlx::query("SELECT * FROM claims WHERE id = ?")
        .bind(claim_id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("claim {claim_id}")))?;
    let mut claim = row_to_claim(&row)?;

    let outcome = claim::apply_review(&mut claim, decision, admin_notes, Utc::now())?;
    if outcome == ReviewOutcome::AlreadyDecided {
        tx.rollback().await?;
        return Ok(claim);
    }

    sqlx::query("UPDATE claims SET status = ?, admin_notes = ?, reviewed_at = ? WHERE id = ?")
        .bind(claim.status.as_str())
        .bind(&claim.admin_notes)
        .bind(claim.reviewed_at.map(|t| t.to_rfc3339()))
        .bind(claim.id.to_string())
        .execute(&mut *tx)
        .await?;

    if decision == ReviewDecision::Verified {
        let row = sqlx::query("SELECT * FROM listings WHERE id = ?")
            .bind(claim.listing_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("listing {}", claim.listing_id)))?;
        let mut listing = row_to_listing(&row)?;

        claim::promote_listing_on_verify(&mut listing);
        listing.updated_at = Utc::now();

        sqlx::query(
            "UPDATE listings SET claim_status = ?, membership_tier = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(listing.claim_status.as_str())
        .bind(listing.membership_tier.as_str())
        .bind(listing.updated_at.to_rfc3339())
        .bind(listing.id.to_string())
        .execute(&mut *tx)
        .await?;
    } else {
        // A rejection releases the listing for a fresh claim
        sqlx::query(
            "UPDATE listings SET claim_status = 'rejected', updated_at = ?
             WHERE id = ? AND claim_status = 'pending'",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(claim.listing_id.to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(claim)
}

/// Reflect a newly submitted claim on the listing's own claim status
pub async fn mark_listing_pending(db: &SqlitePool, listing_id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE listings SET claim_status = 'pending', updated_at = ?
         WHERE id = ? AND claim_status IN ('unclaimed', 'rejected')",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(listing_id.to_string())
    .execute(db)
    .await?;

    Ok(())
}
