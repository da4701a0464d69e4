//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! In floating point:  0.1 + 0.2 = 0.30000000000000004   WRONG!
//!
//! Our solution: integer paise.
//!   ₹5,000.00 is stored as 500_000 paise. All arithmetic is exact;
//!   only display code ever converts to rupees.
//! ```
//!
//! Package balances are drawn down over many redemptions, so any drift
//! would accumulate across a package's lifetime. Integer paise makes the
//! balance invariant (`0 <= remaining <= service_value`) checkable with
//! plain comparisons.
//!
//! ## Usage
//! ```rust
//! use chit_core::money::Money;
//!
//! let balance = Money::from_paise(500_000);          // ₹5,000.00
//! let after = balance - Money::from_paise(120_000);  // ₹3,800.00
//! assert_eq!(after.paise(), 380_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest INR unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: room for the arithmetic that detects over-redemption
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support so API DTOs carry raw paise
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Subtraction that refuses to go below zero.
    ///
    /// Returns `None` when `other` exceeds `self`. This is the primitive
    /// behind the package ledger's all-or-nothing balance check.
    ///
    /// ## Example
    /// ```rust
    /// use chit_core::money::Money;
    ///
    /// let balance = Money::from_paise(1000);
    /// assert_eq!(balance.checked_debit(Money::from_paise(400)), Some(Money::from_paise(600)));
    /// assert_eq!(balance.checked_debit(Money::from_paise(1001)), None);
    /// ```
    #[inline]
    pub fn checked_debit(&self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            None
        } else {
            Some(Money(self.0 - other.0))
        }
    }

    /// Overflow-aware addition, for totalling values that arrived from
    /// the outside world.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable format.
///
/// For logs and debugging; client formatting handles localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Summing an iterator of Money values (service line totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(109_950);
        assert_eq!(money.paise(), 109_950);
        assert_eq!(money.rupees(), 1099);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(5000).paise(), 500_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(109_950)), "₹1099.50");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);

        let mut c = a;
        c -= b;
        assert_eq!(c.paise(), 500);
    }

    #[test]
    fn test_checked_debit() {
        let balance = Money::from_paise(1000);

        assert_eq!(
            balance.checked_debit(Money::from_paise(1000)),
            Some(Money::zero())
        );
        assert_eq!(balance.checked_debit(Money::from_paise(1001)), None);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_paise(600_000);
        assert_eq!(a.checked_add(Money::from_paise(400_000)), Some(Money::from_paise(1_000_000)));
        assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    }

    #[test]
    fn test_sum() {
        let lines = [
            Money::from_paise(120_000),
            Money::from_paise(80_000),
            Money::from_paise(45_000),
        ];
        let total: Money = lines.iter().copied().sum();
        assert_eq!(total.paise(), 245_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_paise(100).is_positive());
        assert!(Money::from_paise(-100).is_negative());
    }
}
