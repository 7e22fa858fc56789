//! Database initialization
//!
//! Creates the directory database on first run and keeps schema creation
//! idempotent so startup is safe against existing databases.

use hub_common::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Wait out short write locks instead of failing
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and indexes (idempotent - safe to call multiple times).
///
/// Public so tests can build schema on in-memory pools.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_listings_table(pool).await?;
    create_claims_table(pool).await?;
    Ok(())
}

async fn create_listings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS listings (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT,
            address TEXT,
            phone TEXT,
            website TEXT,
            description TEXT NOT NULL DEFAULT '',
            membership_tier TEXT NOT NULL DEFAULT 'basic',
            claim_status TEXT NOT NULL DEFAULT 'unclaimed',
            keywords TEXT NOT NULL DEFAULT '[]',
            photos TEXT NOT NULL DEFAULT '[]',
            rating REAL NOT NULL DEFAULT 0,
            special_offers TEXT NOT NULL DEFAULT '[]',
            events TEXT NOT NULL DEFAULT '[]',
            owner_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_category ON listings(category)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_claims_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS claims (
            id TEXT PRIMARY KEY,
            listing_id TEXT NOT NULL REFERENCES listings(id),
            claimer_contact TEXT NOT NULL,
            role TEXT NOT NULL,
            verification_docs TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'pending',
            admin_notes TEXT,
            created_at TEXT NOT NULL,
            reviewed_at TEXT
        )",
    )
    .execute(pool)
    .await?;

    // At most one active claim per listing. The partial index closes the
    // race between concurrent submissions; the application-level duplicate
    // check only exists for a friendlier error message.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_claims_one_active
         ON claims(listing_id)
         WHERE status IN ('pending', 'under_review', 'verified')",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_claims_status ON claims(status)")
        .execute(pool)
        .await?;

    Ok(())
}
