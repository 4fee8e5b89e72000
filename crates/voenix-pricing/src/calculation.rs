//! # Cost Calculation Aggregate
//!
//! One purchase block plus one sales block for one article.
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Edit, Fully Recomputed                         │
//! │                                                                         │
//! │  Admin UI types a value                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EditRequest (JSON) ──► validation ──► Edit                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CostCalculation::apply(edit) ← THIS MODULE                            │
//! │       │                                                                 │
//! │       ├── purchase edit ──► PurchaseBlock ──► total changed?           │
//! │       │                                        │                        │
//! │       │                                        └── yes ──► sales.rebase │
//! │       │                                                                 │
//! │       └── sales edit ─────► SalesBlock (reads purchase total)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Consistent CostCalculation ──► persistence collaborator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never reads the clock while recomputing; the storage layer calls
//! [`CostCalculation::touch`] before saving.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::dto::CostCalculationDto;
use crate::money::Money;
use crate::purchase::PurchaseBlock;
use crate::sales::SalesBlock;
use crate::types::{CalculationMode, Percentage, PurchaseActiveRow, SalesActiveRow, VatRateRef};

// =============================================================================
// Edit
// =============================================================================

/// A single user edit, already validated.
///
/// Each variant maps to exactly one block operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    PurchasePrice { side: CalculationMode, amount: Money },
    PurchaseCost { side: CalculationMode, amount: Money },
    PurchaseCostPercent { percent: Percentage },
    PurchaseVat { percent: Percentage, vat_rate_ref: Option<VatRateRef> },
    PurchaseCalculationMode { mode: CalculationMode },
    PurchaseActiveRow { row: PurchaseActiveRow },
    PurchasePriceUnit { unit: String },
    SalesMargin { side: CalculationMode, amount: Money },
    SalesMarginPercent { percent: Percentage },
    SalesTotal { side: CalculationMode, amount: Money },
    SalesVat { percent: Percentage, vat_rate_ref: Option<VatRateRef> },
    SalesCalculationMode { mode: CalculationMode },
    SalesActiveRow { row: SalesActiveRow },
    SalesTotalUnit { unit: String },
}

impl Edit {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Edit::PurchasePrice { .. } => "purchase_price",
            Edit::PurchaseCost { .. } => "purchase_cost",
            Edit::PurchaseCostPercent { .. } => "purchase_cost_percent",
            Edit::PurchaseVat { .. } => "purchase_vat",
            Edit::PurchaseCalculationMode { .. } => "purchase_calculation_mode",
            Edit::PurchaseActiveRow { .. } => "purchase_active_row",
            Edit::PurchasePriceUnit { .. } => "purchase_price_unit",
            Edit::SalesMargin { .. } => "sales_margin",
            Edit::SalesMarginPercent { .. } => "sales_margin_percent",
            Edit::SalesTotal { .. } => "sales_total",
            Edit::SalesVat { .. } => "sales_vat",
            Edit::SalesCalculationMode { .. } => "sales_calculation_mode",
            Edit::SalesActiveRow { .. } => "sales_active_row",
            Edit::SalesTotalUnit { .. } => "sales_total_unit",
        }
    }
}

// =============================================================================
// Cost Calculation
// =============================================================================

/// Aggregate root: the pricing of one article.
///
/// Serializes as, and only deserializes through, the validated
/// [`CostCalculationDto`] wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CostCalculationDto", into = "CostCalculationDto")]
pub struct CostCalculation {
    id: String,
    article_id: i64,
    purchase: PurchaseBlock,
    sales: SalesBlock,
    /// Optimistic-lock counter, bumped by [`CostCalculation::touch`].
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CostCalculation {
    /// Creates a calculation with built-in defaults (19 % VAT, NET, COST, MARGIN).
    pub fn new(article_id: i64) -> Self {
        PricingConfig::default().new_calculation(article_id)
    }

    /// Assembles a calculation from blocks that are already consistent with
    /// each other.
    pub(crate) fn from_parts(
        id: String,
        article_id: i64,
        purchase: PurchaseBlock,
        sales: SalesBlock,
        created_at: DateTime<Utc>,
    ) -> Self {
        CostCalculation {
            id,
            article_id,
            purchase,
            sales,
            version: 0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Restores the persisted version and last-saved time.
    pub(crate) fn with_audit(mut self, version: i64, updated_at: DateTime<Utc>) -> Self {
        self.version = version;
        self.updated_at = updated_at;
        self
    }

    /// Generates a fresh aggregate id.
    pub(crate) fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn article_id(&self) -> i64 {
        self.article_id
    }

    pub fn purchase(&self) -> &PurchaseBlock {
        &self.purchase
    }

    pub fn sales(&self) -> &SalesBlock {
        &self.sales
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Applies one edit and returns the fully recomputed calculation.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::{CalculationMode, CostCalculation, Edit, Money, Percentage};
    ///
    /// let calc = CostCalculation::new(42)
    ///     .apply(Edit::PurchasePrice { side: CalculationMode::Net, amount: Money::from_cents(1000) })
    ///     .apply(Edit::SalesMarginPercent { percent: Percentage::from_whole(50) });
    ///
    /// assert_eq!(calc.sales().total().net.cents(), 1500);
    /// ```
    #[must_use]
    pub fn apply(self, edit: Edit) -> Self {
        debug!(
            article_id = self.article_id,
            edit = edit.name(),
            "Applying cost calculation edit"
        );

        let purchase_total = self.purchase.total();
        match edit {
            Edit::PurchasePrice { side, amount } => {
                self.update_purchase(|purchase| purchase.set_price(side, amount))
            }
            Edit::PurchaseCost { side, amount } => {
                self.update_purchase(|purchase| purchase.set_cost(side, amount))
            }
            Edit::PurchaseCostPercent { percent } => {
                self.update_purchase(|purchase| purchase.set_cost_percent(percent))
            }
            Edit::PurchaseVat { percent, vat_rate_ref } => {
                self.update_purchase(|purchase| purchase.set_vat_percent(percent, vat_rate_ref))
            }
            Edit::PurchaseCalculationMode { mode } => {
                self.update_purchase(|purchase| purchase.set_calculation_mode(mode))
            }
            Edit::PurchaseActiveRow { row } => {
                self.update_purchase(|purchase| purchase.select_active_row(row))
            }
            Edit::PurchasePriceUnit { unit } => {
                self.update_purchase(|purchase| purchase.set_price_unit(unit))
            }
            Edit::SalesMargin { side, amount } => {
                self.update_sales(|sales| sales.set_margin(side, amount, purchase_total))
            }
            Edit::SalesMarginPercent { percent } => {
                self.update_sales(|sales| sales.set_margin_percent(percent, purchase_total))
            }
            Edit::SalesTotal { side, amount } => {
                self.update_sales(|sales| sales.set_total(side, amount, purchase_total))
            }
            Edit::SalesVat { percent, vat_rate_ref } => self.update_sales(|sales| {
                sales.set_vat_percent(percent, vat_rate_ref, purchase_total)
            }),
            Edit::SalesCalculationMode { mode } => {
                self.update_sales(|sales| sales.set_calculation_mode(mode))
            }
            Edit::SalesActiveRow { row } => {
                self.update_sales(|sales| sales.select_active_row(row))
            }
            Edit::SalesTotalUnit { unit } => {
                self.update_sales(|sales| sales.set_total_unit(unit))
            }
        }
    }

    /// Applies a sequence of edits in order.
    #[must_use]
    pub fn apply_all(self, edits: impl IntoIterator<Item = Edit>) -> Self {
        edits.into_iter().fold(self, CostCalculation::apply)
    }

    /// Puts both blocks back to the configured defaults, keeping identity and
    /// audit fields.
    #[must_use]
    pub fn reset(self, config: &PricingConfig) -> Self {
        debug!(article_id = self.article_id, "Resetting cost calculation");
        let fresh = config.new_calculation_at(self.article_id, self.created_at);
        CostCalculation {
            purchase: fresh.purchase,
            sales: fresh.sales,
            ..self
        }
    }

    /// Stamps the calculation as saved at `now` and bumps the version.
    ///
    /// Called by the persistence layer, never by the recomputation code.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Checks the cross-block invariants.
    ///
    /// Holds for every value returned by the edit operations.
    pub fn is_consistent(&self) -> bool {
        let purchase = &self.purchase;
        let sales = &self.sales;
        let amounts = [
            purchase.price(),
            purchase.cost(),
            purchase.total(),
            sales.margin(),
            sales.total(),
        ];

        amounts.iter().all(|amount| amount.is_consistent())
            && purchase.total() == purchase.price() + purchase.cost()
            && sales.total() == purchase.total() + sales.margin()
    }

    /// Runs a purchase edit; the sales block is rebased only when the
    /// purchase total actually changed.
    fn update_purchase(self, edit: impl FnOnce(PurchaseBlock) -> PurchaseBlock) -> Self {
        let before = self.purchase.total();
        let purchase = edit(self.purchase);

        let sales = if purchase.total() != before {
            debug!(
                article_id = self.article_id,
                purchase_total_net = purchase.total().net.cents(),
                "Purchase total changed, re-deriving sales block"
            );
            self.sales.rebase(purchase.total())
        } else {
            self.sales
        };

        CostCalculation {
            purchase,
            sales,
            ..self
        }
    }

    fn update_sales(self, edit: impl FnOnce(SalesBlock) -> SalesBlock) -> Self {
        let sales = edit(self.sales);
        CostCalculation { sales, ..self }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
