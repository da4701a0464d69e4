//! API error types and their HTTP mapping.
//!
//! ## Error Flow
//! ```text
//! CoreError / DbError (libraries)
//!       │
//!       ▼
//! ApiError (this module) ← picks the HTTP status
//!       │
//!       ▼
//! JSON body { "error": "...", "details": ... }
//! ```
//!
//! Status mapping:
//! - 400 bad request shape
//! - 401 missing/invalid token, bad credentials
//! - 403 role or outlet scope violation
//! - 404 unknown id
//! - 409 state conflicts (double redeem, overdrawn balance, duplicates)
//! - 422 domain validation failures
//! - 500 everything else

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use chit_core::{CoreError, ValidationError};
use chit_db::DbError;

/// API operation errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, never sent to the client.
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "Internal error");
        }

        let body = match &self {
            ApiError::Validation(v) => ErrorBody {
                error: "Validation failed".to_string(),
                details: Some(json!(v.to_string())),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => ApiError::Validation(v),
            CoreError::InvalidVoucherStatus { .. }
            | CoreError::VoucherNotExpired { .. }
            | CoreError::InitialServicesExceedTemplate { .. }
            | CoreError::InsufficientBalance { .. } => ApiError::Conflict(err.to_string()),
            CoreError::EmptyRedemption => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::InvalidVoucherState { .. }
            | DbError::InsufficientBalance { .. }
            | DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::Domain(core) => ApiError::from(core),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for handler functions.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Unauthorized("no".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(CoreError::EmptyRedemption).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_db_conflicts_map_to_409() {
        let err = ApiError::from(DbError::InvalidVoucherState {
            code: "VC-1".into(),
            current_status: chit_core::VoucherStatus::Redeemed,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "name".into(),
        }));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
