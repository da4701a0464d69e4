//! # Package Balance Ledger
//!
//! The balance-tracking arithmetic for prepaid packages, as pure functions.
//!
//! ## Lifecycle
//! ```text
//! assign(template, initial_services)
//!     │   remaining = service_value - sum(initial_services)
//!     │   (rejected when the sum exceeds the ceiling; nothing is created)
//!     ▼
//! CustomerPackage { remaining_service_value }
//!     │
//!     │ redeem(services)          ← repeated over many visits
//!     │   remaining -= sum(services)
//!     │   (rejected when the sum exceeds the balance; all-or-nothing)
//!     ▼
//! remaining == 0  (package exhausted; the row stays for history)
//! ```
//!
//! Every accepted step appends [`ServiceRecord`]s sharing one transaction
//! id; the ledger is append-only, so the balance can always be re-derived
//! as `service_value - sum(records)`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CustomerPackage, PackageTemplate, ServiceRecord};
use crate::validation::{validate_mobile, validate_person_name, validate_service_value};
use crate::{MAX_SERVICE_LINES, MAX_SERVICE_VALUE_PAISE};

// =============================================================================
// Service Lines
// =============================================================================

/// One service entry as submitted by staff: a name and a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLine {
    pub name: String,
    pub value: Money,
}

impl ServiceLine {
    pub fn new(name: impl Into<String>, value: Money) -> Self {
        ServiceLine {
            name: name.into(),
            value,
        }
    }
}

/// Validates a batch of service lines and returns their total.
///
/// ## Rules
/// - at most [`MAX_SERVICE_LINES`] entries
/// - every line has a non-empty name and a value in
///   `1..=MAX_SERVICE_VALUE_PAISE`
///
/// The per-line cap keeps the total inside i64 range, and the summation
/// is checked on top of that; request bodies can never overflow the
/// balance arithmetic.
///
/// An empty batch sums to zero; whether empty is allowed depends on the
/// operation (assignment: yes, redemption: no), so that check lives with
/// the callers.
pub fn sum_services(lines: &[ServiceLine]) -> CoreResult<Money> {
    if lines.len() > MAX_SERVICE_LINES {
        return Err(ValidationError::TooMany {
            field: "services".to_string(),
            max: MAX_SERVICE_LINES,
        }
        .into());
    }

    let mut total = Money::zero();
    for line in lines {
        validate_person_name("service_name", &line.name)?;
        validate_service_value(line.value)?;
        total = total
            .checked_add(line.value)
            .ok_or(ValidationError::OutOfRange {
                field: "services".to_string(),
                min: 1,
                max: MAX_SERVICE_VALUE_PAISE,
            })?;
    }
    Ok(total)
}

// =============================================================================
// Balance Arithmetic
// =============================================================================

/// Starting balance for a package assigned with `initial` services already
/// taken (a customer often has their first sitting on the day they buy).
///
/// ## Errors
/// `InitialServicesExceedTemplate` when `sum(initial) > service_value`;
/// the caller must not create any record in that case.
pub fn initial_remaining(service_value: Money, initial: &[ServiceLine]) -> CoreResult<Money> {
    let taken = sum_services(initial)?;
    service_value
        .checked_debit(taken)
        .ok_or(CoreError::InitialServicesExceedTemplate {
            service_value_paise: service_value.paise(),
            requested_paise: taken.paise(),
        })
}

/// New balance after redeeming `lines` against `remaining`.
///
/// All-or-nothing: a single comparison against the batch total decides the
/// whole redemption.
///
/// ## Errors
/// - `EmptyRedemption` when no lines are submitted
/// - `InsufficientBalance` when `sum(lines) > remaining`
pub fn debit_remaining(remaining: Money, lines: &[ServiceLine]) -> CoreResult<Money> {
    if lines.is_empty() {
        return Err(CoreError::EmptyRedemption);
    }

    let total = sum_services(lines)?;
    remaining
        .checked_debit(total)
        .ok_or(CoreError::InsufficientBalance {
            available_paise: remaining.paise(),
            requested_paise: total.paise(),
        })
}

// =============================================================================
// Assignment and Redemption Batches
// =============================================================================

/// A validated package assignment, ready to persist.
///
/// Produced by [`assign_package`]; the package row and the initial service
/// records (if any) are written together by the database layer.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub package: CustomerPackage,
    pub initial_records: Vec<ServiceRecord>,
}

/// Builds a customer package from a template.
///
/// `remaining = template.service_value - sum(initial)`. Fails without
/// creating anything when the initial services overdraw the template or
/// the customer fields are invalid.
pub fn assign_package(
    template: &PackageTemplate,
    customer_name: &str,
    customer_mobile: &str,
    outlet_id: &str,
    initial: &[ServiceLine],
    assigned_date: DateTime<Utc>,
) -> CoreResult<Assignment> {
    validate_person_name("customer_name", customer_name)?;
    validate_mobile("customer_mobile", customer_mobile)?;

    let remaining = initial_remaining(template.service_value(), initial)?;

    let package = CustomerPackage {
        id: Uuid::new_v4().to_string(),
        customer_name: customer_name.trim().to_string(),
        customer_mobile: customer_mobile.trim().to_string(),
        package_template_id: template.id.clone(),
        outlet_id: outlet_id.to_string(),
        assigned_date,
        remaining_service_value_paise: remaining.paise(),
    };

    let initial_records = if initial.is_empty() {
        Vec::new()
    } else {
        record_batch(&package.id, initial, assigned_date)
    };

    Ok(Assignment {
        package,
        initial_records,
    })
}

/// A validated redemption, ready to persist.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// Balance after the debit.
    pub new_remaining: Money,
    /// Records sharing one fresh transaction id.
    pub records: Vec<ServiceRecord>,
}

/// Builds a redemption against a package's current balance.
///
/// The database layer applies `new_remaining` with a conditional UPDATE and
/// inserts the records in the same transaction, so a rejected redemption
/// leaves the ledger unchanged.
pub fn redeem_from_package(
    package: &CustomerPackage,
    lines: &[ServiceLine],
    redeemed_date: DateTime<Utc>,
) -> CoreResult<Redemption> {
    let new_remaining = debit_remaining(package.remaining_service_value(), lines)?;
    let records = record_batch(&package.id, lines, redeemed_date);

    Ok(Redemption {
        new_remaining,
        records,
    })
}

/// Turns service lines into ledger records sharing one new transaction id.
fn record_batch(
    customer_package_id: &str,
    lines: &[ServiceLine],
    redeemed_date: DateTime<Utc>,
) -> Vec<ServiceRecord> {
    let transaction_id = Uuid::new_v4().to_string();
    lines
        .iter()
        .map(|line| ServiceRecord {
            id: Uuid::new_v4().to_string(),
            customer_package_id: customer_package_id.to_string(),
            service_name: line.name.trim().to_string(),
            service_value_paise: line.value.paise(),
            redeemed_date,
            transaction_id: transaction_id.clone(),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn template(service_value_rupees: i64) -> PackageTemplate {
        PackageTemplate {
            id: "tpl-1".to_string(),
            name: "Pay 10000 Get 15000".to_string(),
            package_value_paise: Money::from_rupees(10_000).paise(),
            service_value_paise: Money::from_rupees(service_value_rupees).paise(),
            created_at: Utc::now(),
        }
    }

    fn lines(values_rupees: &[i64]) -> Vec<ServiceLine> {
        values_rupees
            .iter()
            .enumerate()
            .map(|(i, v)| ServiceLine::new(format!("Service {}", i + 1), Money::from_rupees(*v)))
            .collect()
    }

    #[test]
    fn test_sum_services() {
        let total = sum_services(&lines(&[1200, 800, 450])).unwrap();
        assert_eq!(total, Money::from_rupees(2450));

        // Empty batch sums to zero
        assert_eq!(sum_services(&[]).unwrap(), Money::zero());
    }

    #[test]
    fn test_sum_services_rejects_bad_lines() {
        let bad_name = vec![ServiceLine::new("  ", Money::from_rupees(100))];
        assert!(sum_services(&bad_name).is_err());

        let zero_value = vec![ServiceLine::new("Facial", Money::zero())];
        assert!(sum_services(&zero_value).is_err());

        let negative = vec![ServiceLine::new("Facial", Money::from_paise(-1))];
        assert!(sum_services(&negative).is_err());
    }

    /// Values so large that naive summation would wrap i64 must be
    /// rejected per line, not accepted with a corrupted total.
    #[test]
    fn test_huge_service_values_rejected() {
        let huge = Money::from_paise(i64::MAX / 2 + 1);
        let batch = vec![
            ServiceLine::new("Facial", huge),
            ServiceLine::new("Pedicure", huge),
        ];

        assert!(matches!(
            sum_services(&batch),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // The debit path rejects the same batch and never touches the balance
        let pkg = package_with_balance(10);
        let err = redeem_from_package(&pkg, &batch, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let one_over_cap = vec![ServiceLine::new(
            "Facial",
            Money::from_paise(MAX_SERVICE_VALUE_PAISE + 1),
        )];
        assert!(sum_services(&one_over_cap).is_err());
    }

    #[test]
    fn test_assign_without_initial_services() {
        let tpl = template(15_000);
        let a = assign_package(&tpl, "Meera Iyer", "9876543210", "outlet-1", &[], Utc::now())
            .unwrap();

        assert_eq!(
            a.package.remaining_service_value(),
            Money::from_rupees(15_000)
        );
        assert!(a.initial_records.is_empty());
    }

    #[test]
    fn test_assign_with_initial_services() {
        let tpl = template(15_000);
        let when = Utc::now();
        let a = assign_package(
            &tpl,
            "Meera Iyer",
            "9876543210",
            "outlet-1",
            &lines(&[2000, 1500]),
            when,
        )
        .unwrap();

        assert_eq!(
            a.package.remaining_service_value(),
            Money::from_rupees(11_500)
        );
        assert_eq!(a.initial_records.len(), 2);
        // One transaction groups the initial sitting
        assert_eq!(
            a.initial_records[0].transaction_id,
            a.initial_records[1].transaction_id
        );
        assert!(a
            .initial_records
            .iter()
            .all(|r| r.redeemed_date == when && r.customer_package_id == a.package.id));
    }

    #[test]
    fn test_assign_overdraw_rejected() {
        let tpl = template(15_000);
        let err = assign_package(
            &tpl,
            "Meera Iyer",
            "9876543210",
            "outlet-1",
            &lines(&[10_000, 6_000]),
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CoreError::InitialServicesExceedTemplate {
                service_value_paise: 1_500_000,
                requested_paise: 1_600_000,
            }
        ));
    }

    #[test]
    fn test_assign_exact_ceiling_leaves_zero() {
        let tpl = template(15_000);
        let a = assign_package(
            &tpl,
            "Meera Iyer",
            "9876543210",
            "outlet-1",
            &lines(&[15_000]),
            Utc::now(),
        )
        .unwrap();
        assert!(a.package.remaining_service_value().is_zero());
    }

    fn package_with_balance(rupees: i64) -> CustomerPackage {
        CustomerPackage {
            id: "cp-1".to_string(),
            customer_name: "Meera Iyer".to_string(),
            customer_mobile: "9876543210".to_string(),
            package_template_id: "tpl-1".to_string(),
            outlet_id: "outlet-1".to_string(),
            assigned_date: Utc::now(),
            remaining_service_value_paise: Money::from_rupees(rupees).paise(),
        }
    }

    #[test]
    fn test_redeem_debits_balance() {
        let pkg = package_with_balance(5000);
        let r = redeem_from_package(&pkg, &lines(&[1200, 800]), Utc::now()).unwrap();

        assert_eq!(r.new_remaining, Money::from_rupees(3000));
        assert_eq!(r.records.len(), 2);
        assert_eq!(r.records[0].transaction_id, r.records[1].transaction_id);
    }

    #[test]
    fn test_redeem_over_balance_rejected() {
        let pkg = package_with_balance(1000);
        let err = redeem_from_package(&pkg, &lines(&[600, 500]), Utc::now()).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientBalance {
                available_paise: 100_000,
                requested_paise: 110_000,
            }
        ));
    }

    #[test]
    fn test_redeem_exact_balance_allowed() {
        let pkg = package_with_balance(1000);
        let r = redeem_from_package(&pkg, &lines(&[1000]), Utc::now()).unwrap();
        assert!(r.new_remaining.is_zero());
    }

    #[test]
    fn test_redeem_empty_rejected() {
        let pkg = package_with_balance(1000);
        assert!(matches!(
            redeem_from_package(&pkg, &[], Utc::now()),
            Err(CoreError::EmptyRedemption)
        ));
    }

    /// The invariant from the balance arithmetic side: a balance can reach
    /// zero but never cross it, no matter the order of redemptions.
    #[test]
    fn test_balance_never_negative_across_sequence() {
        let mut remaining = Money::from_rupees(2500);
        let visits = [&lines(&[1000]), &lines(&[1000]), &lines(&[500])];

        for visit in visits {
            remaining = debit_remaining(remaining, visit).unwrap();
        }
        assert!(remaining.is_zero());

        // Exhausted: any further redemption is rejected
        assert!(debit_remaining(remaining, &lines(&[1])).is_err());
    }
}
