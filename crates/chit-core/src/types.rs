//! # Domain Types
//!
//! Core domain types used throughout Chit.
//!
//! ## Type Overview
//! ```text
//! Outlet ◄─────────── User.outlet_id (role "user" only)
//!    ▲  ▲
//!    │  └──────────── Voucher.outlet_id
//!    └─────────────── CustomerPackage.outlet_id
//!
//! PackageTemplate ◄── CustomerPackage.package_template_id
//! CustomerPackage ◄── ServiceRecord.customer_package_id
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Entities have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: `Voucher.code` ("VC-XXXXXXXX"),
//!   `Outlet.code`, `ServiceRecord` bill number (derived from the
//!   transaction id)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Voucher Status
// =============================================================================

/// The lifecycle state of a voucher.
///
/// Transitions are one-way: `Issued → Redeemed` and `Issued → Expired`.
/// Both targets are terminal; there is no re-issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Voucher handed to the recipient, waiting to be used.
    Issued,
    /// Voucher applied against a bill. Terminal.
    Redeemed,
    /// Expiry date passed while still Issued. Terminal.
    Expired,
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoucherStatus::Issued => "Issued",
            VoucherStatus::Redeemed => "Redeemed",
            VoucherStatus::Expired => "Expired",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Voucher Type
// =============================================================================

/// Who a voucher is meant for; drives the printed label only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Business partner referral voucher.
    Partner,
    /// Staff family-and-friends voucher.
    FamilyFriends,
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoucherType::Partner => "Partner",
            VoucherType::FamilyFriends => "Family & Friends",
        };
        f.write_str(s)
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Access level of a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Sees all outlets; manages outlets, users and package templates.
    Admin,
    /// Scoped to exactly one outlet; issues/redeems vouchers and packages.
    User,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Outlet
// =============================================================================

/// A physical branch location.
///
/// Scopes users, vouchers and customer packages; its address/GSTIN/phone
/// appear on printed bills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Outlet {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on bills and pickers.
    pub name: String,

    /// Short branch code - business identifier.
    pub code: String,

    /// Postal address (multi-line).
    pub address: String,

    /// GST identification number of the branch.
    pub gstin: String,

    /// Contact phone number.
    pub phone: String,

    /// When the outlet was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
///
/// The password hash never leaves the server: it is skipped on
/// serialization, so API responses cannot leak it.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,

    /// Login name, unique across the system.
    pub username: String,

    /// Argon2id hash of the password. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Access level.
    pub role: UserRole,

    /// Home outlet for role "user"; None for admins (and for users whose
    /// outlet was deleted, which unassigns rather than cascades).
    pub outlet_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Voucher
// =============================================================================

/// A discount entitlement issued to a person, redeemable once before expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Voucher {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code printed on the voucher ("VC-XXXXXXXX").
    pub code: String,

    /// Person the voucher was handed to.
    pub recipient_name: String,

    /// Recipient mobile number; also a lookup key at redemption time.
    pub recipient_mobile: String,

    /// Outlet that issued the voucher.
    pub outlet_id: String,

    /// Partner or family-and-friends.
    pub voucher_type: VoucherType,

    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,

    /// Bill the voucher was issued against.
    pub bill_no: String,

    /// When the voucher was issued.
    pub issue_date: DateTime<Utc>,

    /// Last instant the voucher may be redeemed.
    pub expiry_date: DateTime<Utc>,

    /// Current lifecycle state.
    pub status: VoucherStatus,

    /// When the voucher was redeemed (Redeemed only).
    pub redeemed_date: Option<DateTime<Utc>>,

    /// Bill the voucher was redeemed against (Redeemed only).
    pub redemption_bill_no: Option<String>,
}

// =============================================================================
// Package Template
// =============================================================================

/// A sellable prepaid bundle: pay `package_value`, receive services worth
/// `service_value`.
///
/// Immutable once created, except for deletion by an admin. Existing
/// customer packages keep working after their template is deleted; the
/// ceiling they were assigned under does not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PackageTemplate {
    pub id: String,

    /// Display name, conventionally "Pay X Get Y".
    pub name: String,

    /// Amount the customer pays, in paise.
    pub package_value_paise: i64,

    /// Service entitlement the customer receives, in paise.
    pub service_value_paise: i64,

    pub created_at: DateTime<Utc>,
}

impl PackageTemplate {
    /// Returns the purchase price as Money.
    #[inline]
    pub fn package_value(&self) -> Money {
        Money::from_paise(self.package_value_paise)
    }

    /// Returns the service entitlement as Money.
    #[inline]
    pub fn service_value(&self) -> Money {
        Money::from_paise(self.service_value_paise)
    }

    /// The conventional display name for a template's values.
    ///
    /// Values are whole rupees in the name, as staff quote them.
    pub fn conventional_name(package_value: Money, service_value: Money) -> String {
        format!("Pay {} Get {}", package_value.rupees(), service_value.rupees())
    }
}

// =============================================================================
// Customer Package
// =============================================================================

/// A package sold to a customer, holding the running balance.
///
/// Invariant: `0 <= remaining_service_value <= template.service_value`
/// at all times. The balance only ever moves down, through redemptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerPackage {
    pub id: String,

    pub customer_name: String,

    /// Lookup key for redemption ("find packages by mobile").
    pub customer_mobile: String,

    /// Template this package was sold under.
    pub package_template_id: String,

    /// Outlet that sold the package.
    pub outlet_id: String,

    pub assigned_date: DateTime<Utc>,

    /// Service value still available, in paise.
    pub remaining_service_value_paise: i64,
}

impl CustomerPackage {
    /// Returns the remaining balance as Money.
    #[inline]
    pub fn remaining_service_value(&self) -> Money {
        Money::from_paise(self.remaining_service_value_paise)
    }
}

// =============================================================================
// Service Record
// =============================================================================

/// One service drawn against a customer package.
///
/// Append-only ledger: records are never mutated or deleted. Records
/// redeemed together share a `transaction_id`, forming one bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ServiceRecord {
    pub id: String,

    pub customer_package_id: String,

    /// What was done ("Hair spa", "Facial", ...). Free text from staff.
    pub service_name: String,

    /// Value drawn from the balance, in paise.
    pub service_value_paise: i64,

    pub redeemed_date: DateTime<Utc>,

    /// Groups records redeemed together into one bill.
    pub transaction_id: String,
}

impl ServiceRecord {
    /// Returns the drawn value as Money.
    #[inline]
    pub fn service_value(&self) -> Money {
        Money::from_paise(self.service_value_paise)
    }

    /// Human bill number for a transaction id: its last six characters,
    /// uppercased. Short enough to read over the counter.
    pub fn bill_no_for(transaction_id: &str) -> String {
        let tail: String = transaction_id
            .chars()
            .rev()
            .take(6)
            .collect::<String>()
            .chars()
            .rev()
            .collect();
        tail.to_uppercase()
    }

    /// Bill number of this record's transaction.
    pub fn bill_no(&self) -> String {
        Self::bill_no_for(&self.transaction_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(VoucherStatus::Issued.to_string(), "Issued");
        assert_eq!(VoucherStatus::Redeemed.to_string(), "Redeemed");
        assert_eq!(VoucherStatus::Expired.to_string(), "Expired");
    }

    #[test]
    fn test_voucher_type_display() {
        assert_eq!(VoucherType::Partner.to_string(), "Partner");
        assert_eq!(VoucherType::FamilyFriends.to_string(), "Family & Friends");
    }

    #[test]
    fn test_conventional_template_name() {
        let name = PackageTemplate::conventional_name(
            Money::from_rupees(10_000),
            Money::from_rupees(15_000),
        );
        assert_eq!(name, "Pay 10000 Get 15000");
    }

    #[test]
    fn test_bill_no_from_transaction_id() {
        assert_eq!(
            ServiceRecord::bill_no_for("550e8400-e29b-41d4-a716-446655440abc"),
            "440ABC"
        );
        // Short ids are used whole
        assert_eq!(ServiceRecord::bill_no_for("x9"), "X9");
    }

    #[test]
    fn test_status_serde_wire_format() {
        let json = serde_json::to_string(&VoucherStatus::Redeemed).unwrap();
        assert_eq!(json, "\"redeemed\"");

        let back: VoucherStatus = serde_json::from_str("\"issued\"").unwrap();
        assert_eq!(back, VoucherStatus::Issued);
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User {
            id: "u-1".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            role: UserRole::Admin,
            outlet_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
