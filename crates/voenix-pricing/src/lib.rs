//! # voenix-pricing: Cost Calculation Engine for the Voenix Shop
//!
//! This crate computes an article's purchase and sales pricing: net / tax /
//! gross amounts under a VAT rate, a cost on top of the purchase price, and a
//! margin on top of the purchase total. Every function is pure.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Voenix Shop Back Office                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin UI (article editor)                    │   │
//! │  │    price field ──► cost field ──► margin field ──► total field  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON (dto)                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ voenix-pricing (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │    tax    │  │ purchase  │  │   sales   │  │   │
//! │  │   │   Money   │  │TaxedAmount│  │   Block   │  │   Block   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │calculation│  │    dto    │  │validation │  │  config   │  │   │
//! │  │   │ aggregate │  │   wire    │  │  bounds   │  │ defaults  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS DURING RECOMPUTATION   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         Persistence collaborator (outside this crate)           │   │
//! │  │      one row per article, calls touch() before saving           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic and one rounding rule
//! - [`types`] - Percentage, calculation mode, active rows
//! - [`tax`] - Net / tax / gross derivation
//! - [`purchase`] - Purchase block recomputation
//! - [`sales`] - Sales block recomputation
//! - [`calculation`] - The aggregate and its edit dispatch
//! - [`dto`] - Wire format and edit requests
//! - [`validation`] - Boundary checks
//! - [`config`] - Defaults for new calculations
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: an edit takes a calculation and returns a new one
//! 2. **Integer Money**: all monetary values are cents (i64), percentages hundredths
//! 3. **Round Once**: every derived amount is rounded exactly once, half away from zero
//! 4. **Always Consistent**: no operation returns a calculation that breaks an invariant
//!
//! ## Example Usage
//!
//! ```rust
//! use voenix_pricing::{CalculationMode, CostCalculation, Edit, Money, Percentage};
//!
//! let calc = CostCalculation::new(42)
//!     .apply(Edit::PurchasePrice { side: CalculationMode::Net, amount: Money::from_cents(1000) })
//!     .apply(Edit::PurchaseCostPercent { percent: Percentage::from_whole(10) })
//!     .apply(Edit::SalesMarginPercent { percent: Percentage::from_whole(20) });
//!
//! assert_eq!(calc.purchase().total().gross.cents(), 1309);
//! assert_eq!(calc.sales().total().net.cents(), 1320);
//! assert!(calc.is_consistent());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculation;
pub mod config;
pub mod dto;
pub mod error;
pub mod money;
pub mod purchase;
pub mod sales;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use voenix_pricing::Money` instead of
// `use voenix_pricing::money::Money`

pub use calculation::{CostCalculation, Edit};
pub use config::PricingConfig;
pub use dto::{CostCalculationDto, EditRequest, NetGrossChoice};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use purchase::PurchaseBlock;
pub use sales::SalesBlock;
pub use tax::TaxedAmount;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest amount accepted at the boundary: 99,999,999.99 €.
///
/// ## Business Reason
/// Amounts are stored as decimals with precision 12 and scale 2.
pub const MAX_MONEY_CENTS: i64 = 9_999_999_999;

/// Largest magnitude accepted for a stored, derived amount.
///
/// Derived amounts outgrow [`MAX_MONEY_CENTS`]: a 999.99 % cost on a maximal
/// price, grossed up at a 999.99 % VAT rate, lands near 110 times the bound.
pub const MAX_STORED_CENTS: i64 = 999_999_999_999_999;

/// VAT applied to both blocks of a new calculation unless configured.
pub const DEFAULT_VAT_PERCENT: Percentage = Percentage::from_whole(19);

/// Display unit of a new calculation.
pub const DEFAULT_PRICE_UNIT: &str = "PER_PIECE";

/// Longest accepted unit label (the storage column holds 50 characters).
pub const MAX_UNIT_LEN: usize = 50;
