//! Common error types for Handy Hub

use thiserror::Error;

/// Common result type for Handy Hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Handy Hub services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entitlement violation (content exceeds tier limits, or claim required)
    #[error(transparent)]
    Entitlement(#[from] crate::entitlement::EntitlementError),

    /// Claim lifecycle violation (duplicate claim, invalid transition)
    #[error(transparent)]
    Claim(#[from] crate::claim::ClaimError),

    /// Stored tier or status value outside the defined set.
    ///
    /// Data-integrity bug, never coerced to a default.
    #[error("Unknown {field} value in store: {value:?}")]
    UnknownVariant { field: &'static str, value: String },
}
