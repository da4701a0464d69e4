//! # Error Types
//!
//! Domain-specific error types for chit-core.
//!
//! ## Error Hierarchy
//! ```text
//! chit-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! chit-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! apps/api errors
//! └── ApiError         - What HTTP clients see (serialized JSON)
//!
//! Flow: ValidationError → CoreError → DbError → ApiError → client
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (voucher code, amounts, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::types::VoucherStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are caught at the
/// API boundary and translated to structured HTTP responses.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Voucher is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Redeeming a voucher that is already Redeemed or Expired
    /// - Expiring a voucher that is not Issued
    #[error("Voucher {code} is {current_status}, cannot {action}")]
    InvalidVoucherStatus {
        code: String,
        current_status: VoucherStatus,
        action: &'static str,
    },

    /// Voucher has not reached its expiry date yet.
    #[error("Voucher {code} is not past its expiry date")]
    VoucherNotExpired { code: String },

    /// Initial services on assignment exceed the template's service value.
    ///
    /// ## When This Occurs
    /// A package entitles ₹X of services; staff tried to record more than
    /// ₹X against it at assignment time. No package is created.
    #[error(
        "Initial services worth {requested_paise} paise exceed template service value {service_value_paise} paise"
    )]
    InitialServicesExceedTemplate {
        service_value_paise: i64,
        requested_paise: i64,
    },

    /// Redemption would overdraw the package balance.
    ///
    /// ## When This Occurs
    /// `sum(services) > remaining_service_value`. The redemption is rejected
    /// as a whole; no partial application.
    #[error(
        "Insufficient package balance: available {available_paise} paise, requested {requested_paise} paise"
    )]
    InsufficientBalance {
        available_paise: i64,
        requested_paise: i64,
    },

    /// A redemption was submitted with no service lines.
    #[error("A redemption must contain at least one service")]
    EmptyRedemption,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed mobile number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Too many entries in a collection.
    #[error("{field} must have at most {max} entries")]
    TooMany { field: String, max: usize },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientBalance {
            available_paise: 50_000,
            requested_paise: 75_000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient package balance: available 50000 paise, requested 75000 paise"
        );

        let err = CoreError::InvalidVoucherStatus {
            code: "VC-A1B2C3D4".to_string(),
            current_status: VoucherStatus::Redeemed,
            action: "redeem",
        };
        assert_eq!(
            err.to_string(),
            "Voucher VC-A1B2C3D4 is Redeemed, cannot redeem"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "recipient_name".to_string(),
        };
        assert_eq!(err.to_string(), "recipient_name is required");

        let err = ValidationError::OutOfRange {
            field: "discount_bps".to_string(),
            min: 1,
            max: 10_000,
        };
        assert_eq!(err.to_string(), "discount_bps must be between 1 and 10000");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "bill_no".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
