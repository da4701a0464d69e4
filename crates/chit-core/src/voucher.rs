//! # Voucher State Machine
//!
//! The voucher lifecycle as pure functions.
//!
//! ## Lifecycle
//! ```text
//!                  ┌──────────┐
//!   issue() ──────►│  Issued  │
//!                  └────┬─────┘
//!          redeem()     │     sweep / expire()
//!        ┌──────────────┴──────────────┐
//!        ▼                             ▼
//!   ┌──────────┐                 ┌──────────┐
//!   │ Redeemed │                 │ Expired  │   (both terminal)
//!   └──────────┘                 └──────────┘
//! ```
//!
//! Redemption requires `status == Issued` at the time of the call and a
//! non-empty redemption bill number. Expiry compares `now` against
//! `expiry_date`; the bulk sweep lives in the database layer and applies
//! the same rule with a conditional UPDATE, so the two can never disagree.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Voucher, VoucherStatus, VoucherType};
use crate::validation::{
    validate_bill_no, validate_discount_bps, validate_expiry_days, validate_mobile,
    validate_person_name,
};

// =============================================================================
// Issuing
// =============================================================================

/// Input for issuing a voucher.
///
/// The outlet is not part of the input: it always comes from the issuing
/// user's account, so an outlet account cannot issue for another branch.
#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub voucher_type: VoucherType,
    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    /// Bill the voucher is issued against.
    pub bill_no: String,
    /// Validity window, in days from the issue instant.
    pub expiry_days: i64,
}

impl Voucher {
    /// Issues a new voucher.
    ///
    /// Validates the recipient fields, generates the UUID id and the
    /// printed "VC-XXXXXXXX" code, and stamps `issue_date = now` with the
    /// expiry `expiry_days` later.
    pub fn issue(new: NewVoucher, outlet_id: &str, now: DateTime<Utc>) -> CoreResult<Voucher> {
        validate_person_name("recipient_name", &new.recipient_name)?;
        validate_mobile("recipient_mobile", &new.recipient_mobile)?;
        validate_discount_bps(new.discount_bps)?;
        validate_bill_no("bill_no", &new.bill_no)?;
        validate_expiry_days(new.expiry_days)?;

        let id = Uuid::new_v4();
        Ok(Voucher {
            id: id.to_string(),
            code: generate_voucher_code(&id),
            recipient_name: new.recipient_name.trim().to_string(),
            recipient_mobile: new.recipient_mobile.trim().to_string(),
            outlet_id: outlet_id.to_string(),
            voucher_type: new.voucher_type,
            discount_bps: new.discount_bps,
            bill_no: new.bill_no.trim().to_string(),
            issue_date: now,
            expiry_date: now + Duration::days(new.expiry_days),
            status: VoucherStatus::Issued,
            redeemed_date: None,
            redemption_bill_no: None,
        })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Redeems the voucher against a bill.
    ///
    /// ## Errors
    /// - `InvalidVoucherStatus` when the voucher is not Issued (already
    ///   redeemed or expired) - redeeming twice fails the second time
    /// - `Validation` when the redemption bill number is empty
    pub fn redeem(&mut self, redemption_bill_no: &str, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status != VoucherStatus::Issued {
            return Err(CoreError::InvalidVoucherStatus {
                code: self.code.clone(),
                current_status: self.status,
                action: "redeem",
            });
        }

        let bill = redemption_bill_no.trim();
        if bill.is_empty() {
            return Err(ValidationError::Required {
                field: "redemption_bill_no".to_string(),
            }
            .into());
        }

        self.status = VoucherStatus::Redeemed;
        self.redeemed_date = Some(now);
        self.redemption_bill_no = Some(bill.to_string());
        Ok(())
    }

    /// Whether the sweep would expire this voucher at `now`.
    ///
    /// Only Issued vouchers expire; a Redeemed voucher stays Redeemed even
    /// after its expiry date passes.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == VoucherStatus::Issued && self.expiry_date < now
    }

    /// Expires the voucher.
    ///
    /// ## Errors
    /// - `InvalidVoucherStatus` when the voucher is not Issued
    /// - `VoucherNotExpired` when its expiry date has not passed
    pub fn expire(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status != VoucherStatus::Issued {
            return Err(CoreError::InvalidVoucherStatus {
                code: self.code.clone(),
                current_status: self.status,
                action: "expire",
            });
        }
        if self.expiry_date >= now {
            return Err(CoreError::VoucherNotExpired {
                code: self.code.clone(),
            });
        }

        self.status = VoucherStatus::Expired;
        Ok(())
    }
}

/// Printed voucher code: "VC-" + the first 8 hex chars of the UUID,
/// uppercased. Short enough to type at the redemption counter, unique
/// enough at single-business scale.
fn generate_voucher_code(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    format!("VC-{}", hex[..8].to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================
