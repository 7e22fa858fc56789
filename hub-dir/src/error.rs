//! HTTP error envelope for hub-dir
//!
//! Maps the common error taxonomy onto structured 4xx/5xx responses with a
//! machine-readable `kind` and a human-readable message. Store failures are
//! logged and surfaced as opaque 500s, never interpreted here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hub_common::claim::ClaimError;
use hub_common::entitlement::EntitlementError;
use hub_common::Error;
use serde_json::json;
use tracing::error;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: message.into(),
        }
    }

    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            kind: "forbidden",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
        }));
        (self.status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::not_found(msg),
            Error::Entitlement(e) => ApiError::from(e),
            Error::Claim(e) => ApiError::from(e),
            Error::UnknownVariant { .. } => {
                // Data-integrity bug: a stored value is outside the defined
                // set. Surface as a 500, never coerce to a default.
                error!("data integrity error: {}", err);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "data_integrity",
                    message: "Internal data error".to_string(),
                }
            }
            other => {
                error!("internal error: {}", other);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        let status = match err {
            ClaimError::Duplicate { .. } => StatusCode::CONFLICT,
            // Reaching this from the UI flow indicates a logic bug; the
            // client gets no state detail beyond "cannot update"
            ClaimError::InvalidTransition { .. } => StatusCode::CONFLICT,
        };
        let message = match &err {
            ClaimError::Duplicate { .. } => err.to_string(),
            ClaimError::InvalidTransition { .. } => "Cannot update claim".to_string(),
        };
        ApiError {
            status,
            kind: err.kind(),
            message,
        }
    }
}
