//! # Sales Block
//!
//! What the unit sells for: a margin on top of the purchase total.
//!
//! ## Active Rows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  purchase total (read-only input, owned by the purchase block)         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  MARGIN          margin typed      ──► margin % , total = pt + margin   │
//! │  MARGIN_PERCENT  margin % typed    ──► margin = pt × %, total           │
//! │  TOTAL           total typed       ──► margin = total − pt, margin %    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The purchase total is passed into every operation instead of being stored
//! here, so the block can be tested without a purchase block at all.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tax::TaxedAmount;
use crate::types::{CalculationMode, Percentage, SalesActiveRow, VatRateRef};
use crate::{DEFAULT_PRICE_UNIT, DEFAULT_VAT_PERCENT};

/// Sales side of a cost calculation.
///
/// ## Invariants
/// - `total == purchase_total + margin` componentwise
/// - `margin_percent` is `margin / purchase_total` on the mode side, except
///   under `MARGIN_PERCENT` where it is the typed value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesBlock {
    margin: TaxedAmount,
    margin_percent: Percentage,
    total: TaxedAmount,
    vat_percent: Percentage,
    vat_rate_ref: Option<VatRateRef>,
    calculation_mode: CalculationMode,
    active_row: SalesActiveRow,
    total_corresponds: CalculationMode,
    total_unit: String,
}

impl Default for SalesBlock {
    fn default() -> Self {
        SalesBlock::new(
            DEFAULT_VAT_PERCENT,
            CalculationMode::Net,
            SalesActiveRow::Margin,
            DEFAULT_PRICE_UNIT,
        )
    }
}

impl SalesBlock {
    /// Creates an all-zero block (consistent with an all-zero purchase total).
    pub fn new(
        vat_percent: Percentage,
        calculation_mode: CalculationMode,
        active_row: SalesActiveRow,
        total_unit: impl Into<String>,
    ) -> Self {
        SalesBlock {
            margin: TaxedAmount::zero(),
            margin_percent: Percentage::zero(),
            total: TaxedAmount::zero(),
            vat_percent,
            vat_rate_ref: None,
            calculation_mode,
            active_row,
            total_corresponds: calculation_mode,
            total_unit: total_unit.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn margin(&self) -> TaxedAmount {
        self.margin
    }

    pub fn margin_percent(&self) -> Percentage {
        self.margin_percent
    }

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

    pub fn active_row(&self) -> SalesActiveRow {
        self.active_row
    }

    /// Side the user last typed into the total field (UI replay only).
    pub fn total_corresponds(&self) -> CalculationMode {
        self.total_corresponds
    }

    pub fn total_unit(&self) -> &str {
        &self.total_unit
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Sets the absolute margin and makes `MARGIN` active.
    ///
    /// The calculation mode stays put; the margin percentage is read from
    /// the mode side.
    #[must_use]
    pub fn set_margin(
        mut self,
        side: CalculationMode,
        amount: Money,
        purchase_total: TaxedAmount,
    ) -> Self {
        self.active_row = SalesActiveRow::Margin;
        self.margin = TaxedAmount::derive(side, amount, self.vat_percent);
        self.sync(purchase_total);
        self
    }

    /// Sets the margin as a percentage of the purchase total and makes
    /// `MARGIN_PERCENT` active.
    ///
    /// ## Example
    /// ```rust
    /// use voenix_pricing::money::Money;
    /// use voenix_pricing::sales::SalesBlock;
    /// use voenix_pricing::tax::TaxedAmount;
    /// use voenix_pricing::types::Percentage;
    ///
    /// let purchase_total = TaxedAmount::from_net(Money::from_cents(1100), Percentage::from_whole(19));
    /// let block = SalesBlock::default().set_margin_percent(Percentage::from_whole(20), purchase_total);
    /// assert_eq!(block.margin().net.cents(), 220);
    /// assert_eq!(block.total().net.cents(), 1320);
    /// ```
    #[must_use]
    pub fn set_margin_percent(mut self, percent: Percentage, purchase_total: TaxedAmount) -> Self {
        self.active_row = SalesActiveRow::MarginPercent;
        self.margin_percent = percent;
        self.sync(purchase_total);
        self
    }

    /// Sets the sales total directly and makes `TOTAL` active.
    ///
    /// The margin is whatever is left over, computed componentwise from the
    /// already rounded totals. It goes negative when the total is below the
    /// purchase total. The typed side is recorded in `total_corresponds`; the
    /// calculation mode stays put.
    #[must_use]
    pub fn set_total(
        mut self,
        side: CalculationMode,
        amount: Money,
        purchase_total: TaxedAmount,
    ) -> Self {
        self.active_row = SalesActiveRow::Total;
        self.total_corresponds = side;
        self.total = TaxedAmount::derive(side, amount, self.vat_percent);
        self.sync(purchase_total);
        self
    }

    /// Switches the VAT rate, keeping the mode side of the authoritative amount.
    #[must_use]
    pub fn set_vat_percent(
        mut self,
        percent: Percentage,
        vat_rate_ref: Option<VatRateRef>,
        purchase_total: TaxedAmount,
    ) -> Self {
        self.vat_percent = percent;
        self.vat_rate_ref = vat_rate_ref;
        self.recompute_in_place(purchase_total);
        self
    }

    /// Changes which side the next margin or total edit is read from.
    ///
    /// Stored amounts are not touched.
    #[must_use]
    pub fn set_calculation_mode(mut self, mode: CalculationMode) -> Self {
        self.calculation_mode = mode;
        self
    }

    /// Selects which of margin / margin percent / total is authoritative.
    /// No value changes.
    #[must_use]
    pub fn select_active_row(mut self, row: SalesActiveRow) -> Self {
        self.active_row = row;
        self
    }

    /// Changes the display unit.
    #[must_use]
    pub fn set_total_unit(mut self, unit: impl Into<String>) -> Self {
        self.total_unit = unit.into();
        self
    }

    /// Re-derives the block against a new purchase total.
    ///
    /// The authoritative value stays pinned: the margin under `MARGIN`, the
    /// percentage under `MARGIN_PERCENT`, the typed total under `TOTAL`.
    #[must_use]
    pub fn rebase(mut self, purchase_total: TaxedAmount) -> Self {
        self.sync(purchase_total);
        self
    }

    /// Re-expands the authoritative amount from its mode side, then re-derives
    /// the dependent fields.
    #[must_use]
    pub fn recompute(mut self, purchase_total: TaxedAmount) -> Self {
        self.recompute_in_place(purchase_total);
        self
    }

    /// Records the side last typed into the total field.
    pub(crate) fn with_total_corresponds(mut self, side: CalculationMode) -> Self {
        self.total_corresponds = side;
        self
    }

    /// Restores stored amounts as they are, without recomputing.
    pub(crate) fn with_amounts(
        mut self,
        margin: TaxedAmount,
        margin_percent: Percentage,
        total: TaxedAmount,
        vat_rate_ref: Option<VatRateRef>,
    ) -> Self {
        self.margin = margin;
        self.margin_percent = margin_percent;
        self.total = total;
        self.vat_rate_ref = vat_rate_ref;
        self
    }

    fn recompute_in_place(&mut self, purchase_total: TaxedAmount) {
        let mode = self.calculation_mode;
        match self.active_row {
            SalesActiveRow::Margin => self.margin = self.margin.rederive(mode, self.vat_percent),
            SalesActiveRow::Total => self.total = self.total.rederive(mode, self.vat_percent),
            SalesActiveRow::MarginPercent => {}
        }
        self.sync(purchase_total);
    }

    /// One hand-written derivation per active row.
    fn sync(&mut self, purchase_total: TaxedAmount) {
        let mode = self.calculation_mode;
        let base = purchase_total.side(mode);

        match self.active_row {
            SalesActiveRow::Margin => {
                self.margin_percent = self.margin.side(mode).percent_of(base);
                self.total = purchase_total + self.margin;
            }
            SalesActiveRow::MarginPercent => {
                let margin = base.percentage(self.margin_percent);
                self.margin = TaxedAmount::derive(mode, margin, self.vat_percent);
                self.total = purchase_total + self.margin;
            }
            SalesActiveRow::Total => {
                self.margin = self.total - purchase_total;
                self.margin_percent = self.margin.side(mode).percent_of(base);
            }
        }
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

    /// Purchase total of 11.00 € net at 19 % (price 10.00 € + 10 % cost).
    fn purchase_total() -> TaxedAmount {
        TaxedAmount {
            net: cents(1100),
            tax: cents(209),
            gross: cents(1309),
        }
    }

    fn assert_additive(block: &SalesBlock, purchase_total: TaxedAmount) {
        assert_eq!(block.total(), purchase_total + block.margin());
        assert!(block.margin().is_consistent());
        assert!(block.total().is_consistent());
    }

    #[test]
    fn test_set_margin() {
        let block = SalesBlock::default().set_margin(CalculationMode::Net, cents(550), purchase_total());
        assert_eq!(block.margin().gross.cents(), 655);
        assert_eq!(block.margin_percent(), Percentage::from_whole(50));
        assert_eq!(block.total().net.cents(), 1650);
        assert_additive(&block, purchase_total());
    }

    #[test]
    fn test_set_margin_percent() {
        let block = SalesBlock::default().set_margin_percent(Percentage::from_whole(20), purchase_total());
        assert_eq!(block.active_row(), SalesActiveRow::MarginPercent);
        assert_eq!(block.margin().net.cents(), 220);
        assert_eq!(block.margin().gross.cents(), 262);
        assert_eq!(block.total().net.cents(), 1320);
        assert_eq!(block.total().gross.cents(), 1571);
        assert_additive(&block, purchase_total());
    }

    #[test]
    fn test_set_total() {
        let block = SalesBlock::default().set_total(CalculationMode::Net, cents(1500), purchase_total());
        assert_eq!(block.active_row(), SalesActiveRow::Total);
        assert_eq!(block.total().gross.cents(), 1785);
        assert_eq!(block.margin().net.cents(), 400);
        assert_eq!(block.margin().gross.cents(), 476);
        assert_eq!(block.margin_percent(), Percentage::from_hundredths(3636));
        assert_additive(&block, purchase_total());
    }

    #[test]
    fn test_total_below_purchase_total_gives_negative_margin() {
        let block = SalesBlock::default().set_total(CalculationMode::Net, cents(1000), purchase_total());
        assert_eq!(block.margin().net.cents(), -100);
        assert!(block.margin_percent().hundredths() < 0);
        assert_additive(&block, purchase_total());
    }

    #[test]
    fn test_zero_purchase_total() {
        let block = SalesBlock::default()
            .set_margin(CalculationMode::Net, cents(500), TaxedAmount::zero());
        assert_eq!(block.margin_percent(), Percentage::zero());
        assert_eq!(block.total().net.cents(), 500);
    }

    #[test]
    fn test_rebase_pins_active_row() {
        let cheaper = TaxedAmount::from_net(cents(800), Percentage::from_whole(19));

        let margin = SalesBlock::default()
            .set_margin(CalculationMode::Net, cents(200), purchase_total())
            .rebase(cheaper);
        assert_eq!(margin.margin().net.cents(), 200);
        assert_eq!(margin.margin_percent(), Percentage::from_whole(25));
        assert_eq!(margin.total().net.cents(), 1000);

        let percent = SalesBlock::default()
            .set_margin_percent(Percentage::from_whole(50), purchase_total())
            .rebase(cheaper);
        assert_eq!(percent.margin().net.cents(), 400);
        assert_eq!(percent.total().net.cents(), 1200);

        let total = SalesBlock::default()
            .set_total(CalculationMode::Net, cents(1500), purchase_total())
            .rebase(cheaper);
        assert_eq!(total.total().net.cents(), 1500);
        assert_eq!(total.margin().net.cents(), 700);
        assert_eq!(total.margin_percent(), Percentage::from_hundredths(8750));
    }

    #[test]
    fn test_set_margin_keeps_calculation_mode() {
        let block = SalesBlock::default().set_margin(CalculationMode::Gross, cents(262), purchase_total());
        assert_eq!(block.calculation_mode(), CalculationMode::Net);
        assert_eq!(block.margin().net.cents(), 220);
        assert_eq!(block.margin_percent(), Percentage::from_whole(20));
        assert_additive(&block, purchase_total());

        let block = block.set_total(CalculationMode::Gross, cents(1785), purchase_total());
        assert_eq!(block.calculation_mode(), CalculationMode::Net);
        assert_eq!(block.total_corresponds(), CalculationMode::Gross);
        assert_eq!(block.margin().net.cents(), 400);
    }

    #[test]
    fn test_vat_change() {
        let block = SalesBlock::default()
            .set_calculation_mode(CalculationMode::Gross)
            .set_total(CalculationMode::Gross, cents(1785), purchase_total())
            .set_vat_percent(Percentage::from_whole(7), Some(VatRateRef(3)), purchase_total());
        assert_eq!(block.total().gross.cents(), 1785);
        assert_eq!(block.total().net.cents(), 1668);
        assert_eq!(block.vat_rate_ref(), Some(VatRateRef(3)));
        assert_additive(&block, purchase_total());
    }

    #[test]
    fn test_select_active_row_keeps_values() {
        let before = SalesBlock::default().set_margin(CalculationMode::Net, cents(300), purchase_total());
        let after = before.clone().select_active_row(SalesActiveRow::Total);
        assert_eq!(after.margin(), before.margin());
        assert_eq!(after.total(), before.total());
        assert_eq!(after.margin_percent(), before.margin_percent());
    }

    #[test]
    fn test_no_drift_without_new_input() {
        let block = SalesBlock::default()
            .set_calculation_mode(CalculationMode::Gross)
            .set_total(CalculationMode::Gross, cents(2001), purchase_total());
        assert_eq!(block.clone().rebase(purchase_total()), block);
        assert_eq!(block.clone().recompute(purchase_total()), block);

        let block = block.set_margin_percent(Percentage::from_hundredths(3333), purchase_total());
        assert_eq!(block.clone().rebase(purchase_total()), block);
        assert_eq!(block.clone().recompute(purchase_total()), block);
    }

    #[test]
    fn test_edits_are_idempotent() {
        let once = SalesBlock::default().set_margin(CalculationMode::Gross, cents(3), purchase_total());
        let twice = once.clone().set_margin(CalculationMode::Gross, cents(3), purchase_total());
        assert_eq!(once, twice);
    }
}
