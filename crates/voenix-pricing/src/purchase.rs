//! # Purchase Block
//!
//! What it costs to acquire one unit: a price, an additional cost and their
//! total.
//!
//! ## Recomputation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Purchase Block Dependencies                         │
//! │                                                                         │
//! │   price ─────────────┬──────────────────────────► total = price + cost  │
//! │                      │                               ▲                  │
//! │   active_row = COST  │  cost (typed) ──► cost % ─────┤                  │
//! │                      │                               │                  │
//! │   active_row = COST% └► cost % (typed) ──► cost ─────┘                  │
//! │                                                                         │
//! │  Every taxed amount is derived from its calculation-mode side with     │
//! │  the block's VAT percentage (see `tax`).                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation consumes the block and returns the recomputed block, so a
//! caller can never observe a half-applied edit.

use serde::{Deserialize, Serialize};
use tracing::trace;
use ts_rs::TS;

use crate::money::Money;
use crate::tax::TaxedAmount;
use crate::types::{CalculationMode, Percentage, PurchaseActiveRow, VatRateRef};
use crate::{DEFAULT_PRICE_UNIT, DEFAULT_VAT_PERCENT};

/// Purchase side of a cost calculation.
///
/// ## Invariants
/// - `total == price + cost` componentwise
/// - with `COST` active, `cost_percent` is `cost / price` on the mode side
/// - with `COST_PERCENT` active, `cost` is `price × cost_percent` on the mode side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBlock {
    price: TaxedAmount,
    cost: TaxedAmount,
    cost_percent: Percentage,
    total: TaxedAmount,
    vat_percent: Percentage,
    vat_rate_ref: Option<VatRateRef>,
    calculation_mode: CalculationMode,
    active_row: PurchaseActiveRow,
    price_corresponds: CalculationMode,
    price_unit: String,
}

impl Default for PurchaseBlock {
    fn default() -> Self {
        PurchaseBlock::new(
            DEFAULT_VAT_PERCENT,
            CalculationMode::Net,
            PurchaseActiveRow::Cost,
            DEFAULT_PRICE_UNIT,
        )
    }
}

impl PurchaseBlock {
    /// Creates an all-zero block.
    pub fn new(
        vat_percent: Percentage,
        calculation_mode: CalculationMode,
        active_row: PurchaseActiveRow,
        price_unit: impl Into<String>,
    ) -> Self {
        PurchaseBlock {
            price: TaxedAmount::zero(),
            cost: TaxedAmount::zero(),
            cost_percent: Percentage::zero(),
            total: TaxedAmount::zero(),
            vat_percent,
            vat_rate_ref: None,
            calculation_mode,
            active_row,
            price_corresponds: calculation_mode,
            price_unit: price_unit.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn price(&self) -> TaxedAmount {
        self.price
    }

    pub fn cost(&self) -> TaxedAmount {
        self.cost
    }

    pub fn cost_percent(&self) -> Percentage {
        self.cost_percent
    }

    /// Purchase total; the sales block builds on top of it.
    pub fn total(&self) -> TaxedAmount {
        self.total
    }

    pub fn vat_percent(&self) -> Percentage {
        self.vat_percent
    }

    pub fn vat_rate_ref(&self) -> Option<VatRateRef> {
        self.vat_rate_ref
    }

    pub fn calculation_mode(&self) -> CalculationMode {
        self.calculation_mode
    }

    pub fn active_row(&self) -> PurchaseActiveRow {
        self.active_row
    }

    /// Side the user last typed into the price field (UI replay only).
    pub fn price_corresponds(&self) -> CalculationMode {
        self.price_corresponds
    }

    pub fn price_unit(&self) -> &str {
        &self.price_unit
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Sets the price from its net or gross side.
    ///
    /// The typed side becomes the block's calculation mode. Under `COST_PERCENT`
    /// the cost follows the new price; under `COST` the cost stays as it is and
    /// the percentage is re-derived.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    /// use voenix_pricing::purchase::PurchaseBlock;
    /// use voenix_pricing::types::CalculationMode;
    ///
    /// let block = PurchaseBlock::default().set_price(CalculationMode::Net, Money::from_cents(1000));
    /// assert_eq!(block.price().gross.cents(), 1190);
    /// assert_eq!(block.total().gross.cents(), 1190);
    /// ```
    #[must_use]
    pub fn set_price(mut self, side: CalculationMode, amount: Money) -> Self {
        self.calculation_mode = side;
        self.price_corresponds = side;
        self.price = TaxedAmount::derive(side, amount, self.vat_percent);
        self.sync_cost();
        self
    }

    /// Sets the absolute cost and makes `COST` the active row.
    ///
    /// The cost is expanded from the typed side, but the calculation mode
    /// stays put: the cost percentage is read from the mode side.
    #[must_use]
    pub fn set_cost(mut self, side: CalculationMode, amount: Money) -> Self {
        self.active_row = PurchaseActiveRow::Cost;
        self.cost = TaxedAmount::derive(side, amount, self.vat_percent);
        self.sync_cost();
        self
    }

    /// Sets the cost as a percentage of the price and makes `COST_PERCENT` active.
    ///
    /// A zero price yields a zero cost.
    #[must_use]
    pub fn set_cost_percent(mut self, percent: Percentage) -> Self {
        self.active_row = PurchaseActiveRow::CostPercent;
        self.cost_percent = percent;
        self.sync_cost();
        self
    }

    /// Switches the VAT rate, keeping the mode side of price and cost.
    #[must_use]
    pub fn set_vat_percent(mut self, percent: Percentage, vat_rate_ref: Option<VatRateRef>) -> Self {
        self.vat_percent = percent;
        self.vat_rate_ref = vat_rate_ref;
        self.recompute_in_place();
        self
    }

    /// Changes which side the next price or cost edit is read from.
    ///
    /// Stored amounts are not touched.
    #[must_use]
    pub fn set_calculation_mode(mut self, mode: CalculationMode) -> Self {
        self.calculation_mode = mode;
        self
    }

    /// Selects which of cost / cost percent is authoritative. No value changes.
    #[must_use]
    pub fn select_active_row(mut self, row: PurchaseActiveRow) -> Self {
        self.active_row = row;
        self
    }

    /// Changes the display unit.
    #[must_use]
    pub fn set_price_unit(mut self, unit: impl Into<String>) -> Self {
        self.price_unit = unit.into();
        self
    }

    /// Re-expands price and cost from their mode side, then re-derives the
    /// dependent fields.
    #[must_use]
    pub fn recompute(mut self) -> Self {
        self.recompute_in_place();
        self
    }

    /// Records the side last typed into the price field.
    pub(crate) fn with_price_corresponds(mut self, side: CalculationMode) -> Self {
        self.price_corresponds = side;
        self
    }

    /// Restores stored amounts as they are, without recomputing.
    pub(crate) fn with_amounts(
        mut self,
        price: TaxedAmount,
        cost: TaxedAmount,
        cost_percent: Percentage,
        total: TaxedAmount,
        vat_rate_ref: Option<VatRateRef>,
    ) -> Self {
        self.price = price;
        self.cost = cost;
        self.cost_percent = cost_percent;
        self.total = total;
        self.vat_rate_ref = vat_rate_ref;
        self
    }

    /// Checks `total == price + cost` componentwise.
    pub fn is_additive(&self) -> bool {
        self.total == self.price + self.cost
    }

    fn recompute_in_place(&mut self) {
        self.price = self.price.rederive(self.calculation_mode, self.vat_percent);
        self.cost = self.cost.rederive(self.calculation_mode, self.vat_percent);
        self.sync_cost();
    }

    /// Derives the non-active cost representation, then the total.
    fn sync_cost(&mut self) {
        let mode = self.calculation_mode;
        let price = self.price.side(mode);

        match self.active_row {
            PurchaseActiveRow::Cost => {
                if price.is_zero() {
                    trace!("Purchase price is zero, cost percent defined as 0");
                }
                self.cost_percent = self.cost.side(mode).percent_of(price);
            }
            PurchaseActiveRow::CostPercent => {
                let cost = price.percentage(self.cost_percent);
                self.cost = TaxedAmount::derive(mode, cost, self.vat_percent);
            }
        }

        self.total = self.price + self.cost;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: i64) -> Money {
        Money::from_cents(value)
    }

    fn priced(net: i64) -> PurchaseBlock {
        PurchaseBlock::default().set_price(CalculationMode::Net, cents(net))
    }

    fn assert_additive(block: &PurchaseBlock) {
        assert_eq!(block.total(), block.price() + block.cost());
        assert!(block.price().is_consistent());
        assert!(block.cost().is_consistent());
        assert!(block.total().is_consistent());
    }

    #[test]
    fn test_defaults() {
        let block = PurchaseBlock::default();
        assert_eq!(block.vat_percent(), Percentage::from_whole(19));
        assert_eq!(block.calculation_mode(), CalculationMode::Net);
        assert_eq!(block.active_row(), PurchaseActiveRow::Cost);
        assert_eq!(block.price_unit(), "PER_PIECE");
        assert_eq!(block.total(), TaxedAmount::zero());
    }

    #[test]
    fn test_set_price_net() {
        let block = priced(1000);
        assert_eq!(block.price().net.cents(), 1000);
        assert_eq!(block.price().tax.cents(), 190);
        assert_eq!(block.price().gross.cents(), 1190);
        assert_eq!(block.price_corresponds(), CalculationMode::Net);
        assert_additive(&block);
    }

    #[test]
    fn test_set_price_gross_switches_mode() {
        let block = PurchaseBlock::default().set_price(CalculationMode::Gross, cents(1190));
        assert_eq!(block.calculation_mode(), CalculationMode::Gross);
        assert_eq!(block.price_corresponds(), CalculationMode::Gross);
        assert_eq!(block.price().net.cents(), 1000);
        assert_additive(&block);
    }

    #[test]
    fn test_cost_percent_follows_price() {
        let block = priced(1000).set_cost_percent(Percentage::from_whole(10));
        assert_eq!(block.cost().net.cents(), 100);
        assert_eq!(block.cost().gross.cents(), 119);
        assert_eq!(block.total().net.cents(), 1100);
        assert_eq!(block.total().gross.cents(), 1309);

        let block = block.set_price(CalculationMode::Net, cents(2000));
        assert_eq!(block.cost().net.cents(), 200);
        assert_eq!(block.cost_percent(), Percentage::from_whole(10));
        assert_additive(&block);
    }

    #[test]
    fn test_cost_stays_when_price_changes() {
        let block = priced(1000).set_cost(CalculationMode::Net, cents(250));
        assert_eq!(block.cost_percent(), Percentage::from_whole(25));

        let block = block.set_price(CalculationMode::Net, cents(500));
        assert_eq!(block.cost().net.cents(), 250);
        assert_eq!(block.cost_percent(), Percentage::from_whole(50));
        assert_additive(&block);
    }

    #[test]
    fn test_set_cost_switches_active_row() {
        let block = priced(1000)
            .set_cost_percent(Percentage::from_whole(10))
            .set_cost(CalculationMode::Net, cents(300));
        assert_eq!(block.active_row(), PurchaseActiveRow::Cost);
        assert_eq!(block.cost_percent(), Percentage::from_whole(30));
    }

    #[test]
    fn test_set_cost_keeps_calculation_mode() {
        let block = priced(1000).set_cost(CalculationMode::Gross, cents(12));
        assert_eq!(block.calculation_mode(), CalculationMode::Net);
        assert_eq!(block.cost().net.cents(), 10);
        assert_eq!(block.cost().gross.cents(), 12);
        assert_eq!(block.cost_percent(), Percentage::from_whole(1));
        assert_additive(&block);

        // a later VAT change re-expands from the net side
        let block = block.set_vat_percent(Percentage::from_whole(7), None);
        assert_eq!(block.cost().net.cents(), 10);
        assert_eq!(block.cost().gross.cents(), 11);
    }

    #[test]
    fn test_zero_price_edge_cases() {
        let block = PurchaseBlock::default().set_cost_percent(Percentage::from_whole(50));
        assert!(block.cost().net.is_zero());

        let block = PurchaseBlock::default().set_cost(CalculationMode::Net, cents(100));
        assert_eq!(block.cost_percent(), Percentage::zero());
        assert_eq!(block.total().net.cents(), 100);
    }

    #[test]
    fn test_vat_change_keeps_mode_side() {
        let block = priced(1000)
            .set_cost(CalculationMode::Net, cents(100))
            .set_vat_percent(Percentage::from_whole(7), Some(VatRateRef(2)));
        assert_eq!(block.price().net.cents(), 1000);
        assert_eq!(block.price().gross.cents(), 1070);
        assert_eq!(block.cost().gross.cents(), 107);
        assert_eq!(block.vat_rate_ref(), Some(VatRateRef(2)));
        assert_additive(&block);
    }

    #[test]
    fn test_mode_change_does_not_touch_values() {
        let before = priced(1000).set_cost(CalculationMode::Net, cents(100));
        let after = before.clone().set_calculation_mode(CalculationMode::Gross);
        assert_eq!(after.price(), before.price());
        assert_eq!(after.cost(), before.cost());
        assert_eq!(after.total(), before.total());
        assert_eq!(after.calculation_mode(), CalculationMode::Gross);
    }

    #[test]
    fn test_select_active_row_keeps_values() {
        let before = priced(1000).set_cost(CalculationMode::Net, cents(100));
        let after = before.clone().select_active_row(PurchaseActiveRow::CostPercent);
        assert_eq!(after.cost(), before.cost());
        assert_eq!(after.cost_percent(), before.cost_percent());
        assert_eq!(after.active_row(), PurchaseActiveRow::CostPercent);
    }

    #[test]
    fn test_recompute_is_fixed_point() {
        let block = PurchaseBlock::default()
            .set_price(CalculationMode::Gross, cents(2999))
            .set_cost_percent(Percentage::from_hundredths(1250));
        assert_eq!(block.clone().recompute(), block);

        let block = block.set_cost(CalculationMode::Gross, cents(333));
        assert_eq!(block.clone().recompute(), block);
    }

    #[test]
    fn test_edits_are_idempotent() {
        let once = priced(1234).set_cost_percent(Percentage::from_hundredths(775));
        let twice = once.clone().set_cost_percent(Percentage::from_hundredths(775));
        assert_eq!(once, twice);

        let once = once.set_price(CalculationMode::Gross, cents(4321));
        let twice = once.clone().set_price(CalculationMode::Gross, cents(4321));
        assert_eq!(once, twice);
    }
}
