//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A browser computing VAT in floats:                                     │
//! │    10.00 € × 1.19 = 11.899999999999999 €  ❌                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + one explicit rounding step               │
//! │    1000 × 11900 / 10000 = 1190 cents exactly                           │
//! │    Every ratio goes through `mul_ratio`, which rounds exactly once     │
//! │    (half away from zero) on an i128 intermediate.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use voenix_pricing::money::Money;
//! use voenix_pricing::types::Percentage;
//!
//! let price = Money::from_cents(1000); // 10.00 €
//! let cost = price.percentage(Percentage::from_hundredths(1000)); // 10 %
//! assert_eq!(cost.cents(), 100);
//! assert_eq!((price + cost).cents(), 1100);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percentage;

// =============================================================================
// Rounding
// =============================================================================

/// Integer division rounding to nearest, ties away from zero.
///
/// The denominator may be negative; the result is the rounded value of the
/// exact quotient `numerator / denominator`. Callers guarantee a non-zero
/// denominator.
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if 2 * remainder.abs() >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: derived amounts may go negative, e.g. the margin when
///   a sales total is typed below the purchase total
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - One implicit currency; there is no currency code on purpose
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by `numerator / denominator`, rounding once, half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    ///
    /// // 10.00 € grossed up by 19 %
    /// let gross = Money::from_cents(1000).mul_ratio(11900, 10000);
    /// assert_eq!(gross.cents(), 1190);
    ///
    /// // 0.5 cent rounds away from zero
    /// assert_eq!(Money::from_cents(1).mul_ratio(1, 2).cents(), 1);
    /// assert_eq!(Money::from_cents(-1).mul_ratio(1, 2).cents(), -1);
    /// ```
    pub fn mul_ratio(&self, numerator: i64, denominator: i64) -> Money {
        debug_assert!(denominator != 0, "mul_ratio with zero denominator");
        let value = div_round_half_away(self.0 as i128 * numerator as i128, denominator as i128);
        Money(value as i64)
    }

    /// Returns `pct` percent of this amount, rounded to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    /// use voenix_pricing::types::Percentage;
    ///
    /// let purchase_total = Money::from_cents(1100);
    /// let margin = purchase_total.percentage(Percentage::from_hundredths(2000)); // 20 %
    /// assert_eq!(margin.cents(), 220);
    /// ```
    pub fn percentage(&self, pct: Percentage) -> Money {
        self.mul_ratio(pct.hundredths(), Percentage::SCALE)
    }

    /// Expresses this amount as a percentage of `base`.
    ///
    /// A zero base yields 0 % rather than dividing by zero.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    ///
    /// let margin = Money::from_cents(400);
    /// let pct = margin.percent_of(Money::from_cents(1100));
    /// assert_eq!(pct.hundredths(), 3636); // 36.36 %
    ///
    /// assert_eq!(margin.percent_of(Money::zero()).hundredths(), 0);
    /// ```
    pub fn percent_of(&self, base: Money) -> Percentage {
        if base.is_zero() {
            return Percentage::zero();
        }
        let hundredths = div_round_half_away(
            self.0 as i128 * Percentage::SCALE as i128,
            base.0 as i128,
        );
        Percentage::from_hundredths(hundredths as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as euros, for logs and debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02} €", sign, abs / 100, abs % 100)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
