//! # Domain Types
//!
//! Small value types shared by both calculation blocks.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │   Percentage    │   │ CalculationMode │   │  PurchaseActiveRow  │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  hundredths i64 │   │  Net            │   │  Cost               │   │
//! │  │  1900 = 19.00 % │   │  Gross          │   │  CostPercent        │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │   VatRateRef    │   │   SalesActiveRow    │                         │
//! │  │  ─────────────  │   │  ─────────────────  │                         │
//! │  │  opaque i64 id  │   │  Margin             │                         │
//! │  │  (master data)  │   │  MarginPercent      │                         │
//! │  └─────────────────┘   │  Total              │                         │
//! │                        └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Active-row tokens follow the shop API: `cost`, `costPercent`, `margin`,
//! `marginPercent`, `total`. Parsing also accepts the snake_case spelling
//! (`cost_percent`) that older clients send.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Percentage
// =============================================================================

/// A percentage with exactly two fractional digits, stored in hundredths.
///
/// ## Why Hundredths?
/// `19.00 %` is stored as `1900`, `36.36 %` as `3636`. Same idea as basis
/// points: every percentage the shop stores has scale 2, so an integer is
/// exact and no decimal library is needed.
///
/// Derived percentages (cost or margin ratios) are not clamped; a sales total
/// typed below the purchase total produces a negative margin percentage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Percentage(i64);

impl Percentage {
    /// Hundredths of a percent in one whole (100 %).
    pub const SCALE: i64 = 10_000;

    /// Largest percentage accepted at the boundary (999.99 %).
    pub const MAX: Percentage = Percentage(99_999);

    /// Largest magnitude accepted for a stored, derived percentage.
    ///
    /// A cost of [`crate::MAX_MONEY_CENTS`] on a one-cent price is
    /// 999,999,999,900 %; this leaves a factor of ten above that.
    pub const MAX_STORED: Percentage = Percentage(999_999_999_999_999);

    /// Creates a percentage from hundredths (`1900` = 19 %).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Percentage(hundredths)
    }

    /// Creates a percentage from whole percent (`19` = 19 %).
    #[inline]
    pub const fn from_whole(percent: i64) -> Self {
        Percentage(percent * 100)
    }

    /// Returns the value in hundredths of a percent.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the percentage as a float (for the wire DTO and display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// VAT Rate Reference
// =============================================================================

/// Identifier of a VAT rate in the external master data.
///
/// The engine never interprets it; it travels alongside `vat_percent` so the
/// caller can show which rate was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VatRateRef(pub i64);

// =============================================================================
// Calculation Mode
// =============================================================================

/// Which side of a taxed amount is authoritative in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalculationMode {
    /// Net amounts are typed, tax and gross are derived.
    #[default]
    Net,
    /// Gross amounts are typed, net and tax are derived.
    Gross,
}

impl CalculationMode {
    /// Wire token (`NET` / `GROSS`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            CalculationMode::Net => "NET",
            CalculationMode::Gross => "GROSS",
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NET" => Ok(CalculationMode::Net),
            "GROSS" => Ok(CalculationMode::Gross),
            _ => Err(ValidationError::invalid_enum(
                "calculationMode",
                s,
                &["NET", "GROSS"],
            )),
        }
    }
}

// =============================================================================
// Active Rows
// =============================================================================

/// Authoritative field of the purchase block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseActiveRow {
    /// The absolute cost is typed; the cost percent follows.
    #[default]
    Cost,
    /// The cost percent is typed; the absolute cost follows the price.
    CostPercent,
}

impl PurchaseActiveRow {
    /// Wire token (`cost` / `costPercent`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            PurchaseActiveRow::Cost => "cost",
            PurchaseActiveRow::CostPercent => "costPercent",
        }
    }
}

impl fmt::Display for PurchaseActiveRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseActiveRow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cost" => Ok(PurchaseActiveRow::Cost),
            "costpercent" | "cost_percent" => Ok(PurchaseActiveRow::CostPercent),
            _ => Err(ValidationError::invalid_enum(
                "purchaseActiveRow",
                s,
                &["cost", "costPercent"],
            )),
        }
    }
}

/// Authoritative field of the sales block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SalesActiveRow {
    /// The absolute margin is typed.
    #[default]
    Margin,
    /// The margin percent over the purchase total is typed.
    MarginPercent,
    /// The final sales total is typed; the margin is what is left over.
    Total,
}

impl SalesActiveRow {
    /// Wire token (`margin` / `marginPercent` / `total`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            SalesActiveRow::Margin => "margin",
            SalesActiveRow::MarginPercent => "marginPercent",
            SalesActiveRow::Total => "total",
        }
    }
}

impl fmt::Display for SalesActiveRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesActiveRow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "margin" => Ok(SalesActiveRow::Margin),
            "marginpercent" | "margin_percent" => Ok(SalesActiveRow::MarginPercent),
            "total" => Ok(SalesActiveRow::Total),
            _ => Err(ValidationError::invalid_enum(
                "salesActiveRow",
                s,
                &["margin", "marginPercent", "total"],
            )),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_hundredths(1900).to_string(), "19.00%");
        assert_eq!(Percentage::from_hundredths(3636).to_string(), "36.36%");
        assert_eq!(Percentage::from_hundredths(-5).to_string(), "-0.05%");
        assert_eq!(Percentage::from_whole(7), Percentage::from_hundredths(700));
    }

    #[test]
    fn test_calculation_mode_parsing() {
        assert_eq!("NET".parse::<CalculationMode>().unwrap(), CalculationMode::Net);
        assert_eq!(" gross ".parse::<CalculationMode>().unwrap(), CalculationMode::Gross);
        assert!(matches!(
            "brutto".parse::<CalculationMode>(),
            Err(ValidationError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_active_row_tokens() {
        assert_eq!("cost".parse::<PurchaseActiveRow>().unwrap(), PurchaseActiveRow::Cost);
        assert_eq!(
            "costPercent".parse::<PurchaseActiveRow>().unwrap(),
            PurchaseActiveRow::CostPercent
        );
        assert_eq!(
            "COST_PERCENT".parse::<PurchaseActiveRow>().unwrap(),
            PurchaseActiveRow::CostPercent
        );
        assert_eq!(
            "margin_percent".parse::<SalesActiveRow>().unwrap(),
            SalesActiveRow::MarginPercent
        );
        assert_eq!("TOTAL".parse::<SalesActiveRow>().unwrap(), SalesActiveRow::Total);
        assert!("price".parse::<SalesActiveRow>().is_err());
    }

    #[test]
    fn test_serde_tokens() {
        assert_eq!(
            serde_json::to_string(&PurchaseActiveRow::CostPercent).unwrap(),
            "\"costPercent\""
        );
        assert_eq!(
            serde_json::to_string(&SalesActiveRow::MarginPercent).unwrap(),
            "\"marginPercent\""
        );
        assert_eq!(serde_json::to_string(&CalculationMode::Gross).unwrap(), "\"GROSS\"");
        assert_eq!(serde_json::to_string(&Percentage::from_hundredths(1900)).unwrap(), "1900");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(CalculationMode::default(), CalculationMode::Net);
        assert_eq!(PurchaseActiveRow::default(), PurchaseActiveRow::Cost);
        assert_eq!(SalesActiveRow::default(), SalesActiveRow::Margin);
    }
}
