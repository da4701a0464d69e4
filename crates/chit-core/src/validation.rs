//! # Validation Module
//!
//! Business rule validation for Chit.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                           │
//! │  ├── Type validation (JSON deserialization)                             │
//! │  └── Auth / role checks                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - Business rule validation                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                        │
//! │  └── Conditional UPDATEs (state and balance guards)                     │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use chit_core::validation::{validate_mobile, validate_discount_bps};
//!
//! // Validate before issuing a voucher
//! validate_mobile("recipient_mobile", "9876543210").unwrap();
//! validate_discount_bps(2000).unwrap(); // 20%
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DISCOUNT_BPS, MAX_SERVICE_VALUE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person's name (recipient, customer, service name).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 100 characters
pub fn validate_person_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an Indian mobile number.
///
/// ## Rules
/// - Exactly 10 digits, no prefix, no separators
///
/// ## Example
/// ```rust
/// use chit_core::validation::validate_mobile;
///
/// assert!(validate_mobile("mobile", "9876543210").is_ok());
/// assert!(validate_mobile("mobile", "+919876543210").is_err());
/// assert!(validate_mobile("mobile", "98765").is_err());
/// ```
pub fn validate_mobile(field: &str, mobile: &str) -> ValidationResult<()> {
    let mobile = mobile.trim();

    if mobile.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be exactly 10 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a bill number (issuing bill or redemption bill).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 50 characters
pub fn validate_bill_no(field: &str, bill_no: &str) -> ValidationResult<()> {
    let bill_no = bill_no.trim();

    if bill_no.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if bill_no.len() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - Must not be empty
/// - 3 to 50 characters
/// - Letters, numbers, hyphens, underscores only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 || username.len() > 50 {
        return Err(ValidationError::OutOfRange {
            field: "username length".to_string(),
            min: 3,
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a password at account creation time.
///
/// ## Rules
/// - At least 8 characters, at most 128
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.len() < 8 || password.len() > 128 {
        return Err(ValidationError::OutOfRange {
            field: "password length".to_string(),
            min: 8,
            max: 128,
        });
    }

    Ok(())
}

/// Validates an outlet code (the short identifier staff see, e.g. "BLR-01").
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
/// - Letters, numbers, hyphens, underscores only
pub fn validate_outlet_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 20,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a voucher discount in basis points.
///
/// ## Rules
/// - Must be between 1 and 10000 (above 0% and up to 100%)
///
/// ## Example
/// ```rust
/// use chit_core::validation::validate_discount_bps;
///
/// assert!(validate_discount_bps(2000).is_ok());  // 20%
/// assert!(validate_discount_bps(10000).is_ok()); // 100%
/// assert!(validate_discount_bps(0).is_err());
/// assert!(validate_discount_bps(10001).is_err());
/// ```
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps == 0 || bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 1,
            max: MAX_DISCOUNT_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a voucher validity period in days.
///
/// ## Rules
/// - Must be at least 1 day
/// - Must be at most 3650 days (ten years; catches fat-fingered input)
pub fn validate_expiry_days(days: i64) -> ValidationResult<()> {
    if days < 1 || days > 3650 {
        return Err(ValidationError::OutOfRange {
            field: "expiry_days".to_string(),
            min: 1,
            max: 3650,
        });
    }

    Ok(())
}

/// Validates a monetary value (template values, service line values).
///
/// ## Rules
/// - Must be strictly positive
/// - Must be at most [`MAX_SERVICE_VALUE_PAISE`]; the cap also guarantees
///   a full batch of [`crate::MAX_SERVICE_LINES`] lines sums without
///   overflow
pub fn validate_service_value(value: Money) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "service value".to_string(),
        });
    }
    if value.paise() > MAX_SERVICE_VALUE_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "service value".to_string(),
            min: 1,
            max: MAX_SERVICE_VALUE_PAISE,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("name", "Meera Iyer").is_ok());
        assert!(validate_person_name("name", "").is_err());
        assert!(validate_person_name("name", "   ").is_err());
        assert!(validate_person_name("name", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_mobile() {
        assert!(validate_mobile("mobile", "9876543210").is_ok());
        assert!(validate_mobile("mobile", " 9876543210 ").is_ok());

        assert!(validate_mobile("mobile", "").is_err());
        assert!(validate_mobile("mobile", "98765").is_err());
        assert!(validate_mobile("mobile", "98765432100").is_err());
        assert!(validate_mobile("mobile", "+919876543210").is_err());
        assert!(validate_mobile("mobile", "98765abcde").is_err());
    }

    #[test]
    fn test_validate_bill_no() {
        assert!(validate_bill_no("bill_no", "INV-2025-0042").is_ok());
        assert!(validate_bill_no("bill_no", "").is_err());
        assert!(validate_bill_no("bill_no", &"B".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("front_desk-2").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_outlet_code() {
        assert!(validate_outlet_code("BLR-01").is_ok());
        assert!(validate_outlet_code("HQ").is_ok());

        assert!(validate_outlet_code("").is_err());
        assert!(validate_outlet_code("has space").is_err());
        assert!(validate_outlet_code(&"X".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_discount_bps() {
        assert!(validate_discount_bps(1).is_ok());
        assert!(validate_discount_bps(2000).is_ok());
        assert!(validate_discount_bps(10000).is_ok());

        assert!(validate_discount_bps(0).is_err());
        assert!(validate_discount_bps(10001).is_err());
    }

    #[test]
    fn test_validate_expiry_days() {
        assert!(validate_expiry_days(1).is_ok());
        assert!(validate_expiry_days(30).is_ok());
        assert!(validate_expiry_days(0).is_err());
        assert!(validate_expiry_days(-5).is_err());
        assert!(validate_expiry_days(10_000).is_err());
    }

    #[test]
    fn test_validate_service_value() {
        assert!(validate_service_value(Money::from_paise(100)).is_ok());
        assert!(validate_service_value(Money::from_paise(MAX_SERVICE_VALUE_PAISE)).is_ok());

        assert!(validate_service_value(Money::zero()).is_err());
        assert!(validate_service_value(Money::from_paise(-100)).is_err());
        assert!(validate_service_value(Money::from_paise(MAX_SERVICE_VALUE_PAISE + 1)).is_err());
        assert!(validate_service_value(Money::from_paise(i64::MAX)).is_err());
    }

}
