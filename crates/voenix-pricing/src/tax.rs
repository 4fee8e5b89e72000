//! # VAT Derivation
//!
//! Net / tax / gross triples and the one rule that links them.
//!
//! ## Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NET given (mode = NET)             GROSS given (mode = GROSS)          │
//! │                                                                         │
//! │    gross = round(net × (1 + v))       net = round(gross ÷ (1 + v))      │
//! │    tax   = gross − net                tax = gross − net                 │
//! │                                                                         │
//! │  v = vat_percent / 100, rounding half away from zero, exactly once.    │
//! │  net + tax == gross holds by construction.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Round trip: deriving gross from a net and the net back from that gross
//! lands within one cent of the original net (exactly on it for VAT >= 0).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CalculationMode, Percentage};

/// One monetary concept expressed as net, tax and gross.
///
/// ## Invariant
/// `net + tax == gross`. Constructors in this module and the componentwise
/// `Add`/`Sub` impls keep it; stored triples are checked by
/// [`crate::validation::validate_stored_amount`] before they are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxedAmount {
    pub net: Money,
    pub tax: Money,
    pub gross: Money,
}

impl TaxedAmount {
    /// The all-zero amount.
    pub const fn zero() -> Self {
        TaxedAmount {
            net: Money::zero(),
            tax: Money::zero(),
            gross: Money::zero(),
        }
    }

    /// Derives tax and gross from a net amount.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    /// use voenix_pricing::tax::TaxedAmount;
    /// use voenix_pricing::types::Percentage;
    ///
    /// let price = TaxedAmount::from_net(Money::from_cents(1000), Percentage::from_whole(19));
    /// assert_eq!(price.tax.cents(), 190);
    /// assert_eq!(price.gross.cents(), 1190);
    /// ```
    pub fn from_net(net: Money, vat: Percentage) -> Self {
        let gross = net.mul_ratio(Percentage::SCALE + vat.hundredths(), Percentage::SCALE);
        TaxedAmount {
            net,
            tax: gross - net,
            gross,
        }
    }

    /// Derives net and tax from a gross amount.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    /// use voenix_pricing::tax::TaxedAmount;
    /// use voenix_pricing::types::Percentage;
    ///
    /// let price = TaxedAmount::from_gross(Money::from_cents(1190), Percentage::from_whole(19));
    /// assert_eq!(price.net.cents(), 1000);
    /// assert_eq!(price.tax.cents(), 190);
    /// ```
    pub fn from_gross(gross: Money, vat: Percentage) -> Self {
        let net = gross.mul_ratio(Percentage::SCALE, Percentage::SCALE + vat.hundredths());
        TaxedAmount {
            net,
            tax: gross - net,
            gross,
        }
    }

    /// Derives the full triple from the side named by `mode`.
    pub fn derive(mode: CalculationMode, amount: Money, vat: Percentage) -> Self {
        match mode {
            CalculationMode::Net => TaxedAmount::from_net(amount, vat),
            CalculationMode::Gross => TaxedAmount::from_gross(amount, vat),
        }
    }

    /// Re-derives the other two parts from this amount's `mode` side.
    ///
    /// Used when the VAT rate changes: the authoritative side is kept as is.
    pub fn rederive(&self, mode: CalculationMode, vat: Percentage) -> Self {
        TaxedAmount::derive(mode, self.side(mode), vat)
    }

    /// Returns the net or gross part.
    #[inline]
    pub const fn side(&self, mode: CalculationMode) -> Money {
        match mode {
            CalculationMode::Net => self.net,
            CalculationMode::Gross => self.gross,
        }
    }

    /// Checks `net + tax == gross`.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.net + self.tax == self.gross
    }
}

/// Componentwise sum; used for `total = price + cost` and `total = purchase + margin`.
impl Add for TaxedAmount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        TaxedAmount {
            net: self.net + other.net,
            tax: self.tax + other.tax,
            gross: self.gross + other.gross,
        }
    }
}

/// Componentwise difference; used for `margin = sales total − purchase total`.
impl Sub for TaxedAmount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        TaxedAmount {
            net: self.net - other.net,
            tax: self.tax - other.tax,
            gross: self.gross - other.gross,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vat19() -> Percentage {
        Percentage::from_whole(19)
    }

    #[test]
    fn test_from_net() {
        let amount = TaxedAmount::from_net(Money::from_cents(1000), vat19());
        assert_eq!(amount.net.cents(), 1000);
        assert_eq!(amount.tax.cents(), 190);
        assert_eq!(amount.gross.cents(), 1190);
        assert!(amount.is_consistent());
    }

    #[test]
    fn test_from_gross_rounds_half_away() {
        // 119 / 1.19 = 100 exactly
        let amount = TaxedAmount::from_gross(Money::from_cents(119), vat19());
        assert_eq!(amount.net.cents(), 100);

        // 3 / 1.19 = 2.52 → 3
        let amount = TaxedAmount::from_gross(Money::from_cents(3), vat19());
        assert_eq!(amount.net.cents(), 3);
        assert_eq!(amount.tax.cents(), 0);

        // 7 % of 50 = 3.5 → tax 4
        let amount = TaxedAmount::from_net(Money::from_cents(50), Percentage::from_whole(7));
        assert_eq!(amount.gross.cents(), 54);
    }

    #[test]
    fn test_zero_vat() {
        let amount = TaxedAmount::from_gross(Money::from_cents(999), Percentage::zero());
        assert_eq!(amount.net.cents(), 999);
        assert!(amount.tax.is_zero());
    }

    #[test]
    fn test_round_trip_within_one_cent() {
        for vat in [0, 700, 1900, 2550, 99_999] {
            let vat = Percentage::from_hundredths(vat);
            for net in 0..2_000 {
                let net = Money::from_cents(net);
                let gross = TaxedAmount::from_net(net, vat).gross;
                let back = TaxedAmount::from_gross(gross, vat).net;
                assert!((back - net).cents().abs() <= 1, "net {net} vat {vat} came back as {back}");
            }
        }
    }

    #[test]
    fn test_componentwise_ops() {
        let price = TaxedAmount::from_net(Money::from_cents(1000), vat19());
        let cost = TaxedAmount::from_net(Money::from_cents(100), vat19());
        let total = price + cost;
        assert_eq!(total.net.cents(), 1100);
        assert_eq!(total.tax.cents(), 209);
        assert_eq!(total.gross.cents(), 1309);
        assert_eq!(total - cost, price);
    }

    #[test]
    fn test_rederive_keeps_mode_side() {
        let amount = TaxedAmount::from_gross(Money::from_cents(1190), vat19());
        let rederived = amount.rederive(CalculationMode::Gross, Percentage::from_whole(7));
        assert_eq!(rederived.gross.cents(), 1190);
        assert_eq!(rederived.net.cents(), 1112);
    }
}
