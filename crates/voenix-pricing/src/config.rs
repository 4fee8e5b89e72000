//! # Pricing Configuration
//!
//! Defaults used when a new cost calculation is created or reset.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VOENIX_PRICING_PURCHASE_VAT_PERCENT=7                              │
//! │     VOENIX_PRICING_SALES_MODE=gross                                    │
//! │                                                                         │
//! │  2. TOML Config Text                                                   │
//! │     read by the caller, parsed by `PricingConfig::from_toml_str`       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     19 % VAT, NET, COST / MARGIN, PER_PIECE                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pricing.toml
//! [purchase]
//! vat_percent = 19.0
//! calculation_mode = "NET"
//! active_row = "cost"
//! unit = "PER_PIECE"
//!
//! [sales]
//! vat_percent = 19.0
//! calculation_mode = "GROSS"
//! active_row = "marginPercent"
//! unit = "PER_PIECE"
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::CostCalculation;
use crate::error::{CoreError, CoreResult};
use crate::purchase::PurchaseBlock;
use crate::sales::SalesBlock;
use crate::types::{CalculationMode, Percentage, PurchaseActiveRow, SalesActiveRow};
use crate::validation::{validate_percentage, validate_price_unit};
use crate::{DEFAULT_PRICE_UNIT, DEFAULT_VAT_PERCENT};

// =============================================================================
// Block Defaults
// =============================================================================

/// Defaults for the purchase block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDefaults {
    /// VAT percentage as a decimal number (`19.0` = 19 %).
    #[serde(default = "default_vat_percent")]
    pub vat_percent: f64,

    #[serde(default)]
    pub calculation_mode: CalculationMode,

    #[serde(default)]
    pub active_row: PurchaseActiveRow,

    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Defaults for the sales block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDefaults {
    /// VAT percentage as a decimal number (`19.0` = 19 %).
    #[serde(default = "default_vat_percent")]
    pub vat_percent: f64,

    #[serde(default)]
    pub calculation_mode: CalculationMode,

    #[serde(default)]
    pub active_row: SalesActiveRow,

    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_vat_percent() -> f64 {
    DEFAULT_VAT_PERCENT.as_f64()
}

fn default_unit() -> String {
    DEFAULT_PRICE_UNIT.to_string()
}

impl Default for PurchaseDefaults {
    fn default() -> Self {
        PurchaseDefaults {
            vat_percent: default_vat_percent(),
            calculation_mode: CalculationMode::default(),
            active_row: PurchaseActiveRow::default(),
            unit: default_unit(),
        }
    }
}

impl Default for SalesDefaults {
    fn default() -> Self {
        SalesDefaults {
            vat_percent: default_vat_percent(),
            calculation_mode: CalculationMode::default(),
            active_row: SalesActiveRow::default(),
            unit: default_unit(),
        }
    }
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Complete pricing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub purchase: PurchaseDefaults,

    #[serde(default)]
    pub sales: SalesDefaults,
}

impl PricingConfig {
    /// Parses and validates TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let config: PricingConfig = toml::from_str(contents)?;
        config.validate()?;
        info!(
            purchase_vat = config.purchase.vat_percent,
            sales_vat = config.sales.vat_percent,
            "Loaded pricing config"
        );
        Ok(config)
    }

    /// Built-in defaults overridden by the process environment.
    pub fn from_env() -> CoreResult<Self> {
        let mut config = PricingConfig::default();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `VOENIX_PRICING_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and skipped; [`PricingConfig::validate`]
    /// catches values that parse but are out of range.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("VOENIX_PRICING_PURCHASE_VAT_PERCENT") {
            match value.trim().parse::<f64>() {
                Ok(percent) => {
                    debug!(percent, "Overriding purchase VAT from environment");
                    self.purchase.vat_percent = percent;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid purchase VAT in environment"),
            }
        }

        if let Some(value) = lookup("VOENIX_PRICING_SALES_VAT_PERCENT") {
            match value.trim().parse::<f64>() {
                Ok(percent) => {
                    debug!(percent, "Overriding sales VAT from environment");
                    self.sales.vat_percent = percent;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid sales VAT in environment"),
            }
        }

        if let Some(value) = lookup("VOENIX_PRICING_PURCHASE_MODE") {
            match value.parse::<CalculationMode>() {
                Ok(mode) => {
                    debug!(%mode, "Overriding purchase calculation mode from environment");
                    self.purchase.calculation_mode = mode;
                }
                Err(e) => warn!(error = %e, "Ignoring purchase mode in environment"),
            }
        }

        if let Some(value) = lookup("VOENIX_PRICING_SALES_MODE") {
            match value.parse::<CalculationMode>() {
                Ok(mode) => {
                    debug!(%mode, "Overriding sales calculation mode from environment");
                    self.sales.calculation_mode = mode;
                }
                Err(e) => warn!(error = %e, "Ignoring sales mode in environment"),
            }
        }
    }

    /// Validates VAT percentages and units.
    pub fn validate(&self) -> CoreResult<()> {
        validate_percentage("purchase.vat_percent", self.purchase.vat_percent)?;
        validate_percentage("sales.vat_percent", self.sales.vat_percent)?;
        validate_price_unit("purchase.unit", &self.purchase.unit)?;
        validate_price_unit("sales.unit", &self.sales.unit)?;
        Ok(())
    }

    /// Builds a fresh calculation for `article_id`, stamped with the current time.
    pub fn new_calculation(&self, article_id: i64) -> CostCalculation {
        self.new_calculation_at(article_id, Utc::now())
    }

    /// Builds a fresh calculation with an explicit creation time.
    ///
    /// Out-of-range values that slipped past [`PricingConfig::validate`] fall
    /// back to the built-in defaults.
    pub fn new_calculation_at(&self, article_id: i64, now: DateTime<Utc>) -> CostCalculation {
        let purchase = PurchaseBlock::new(
            block_vat("purchase.vat_percent", self.purchase.vat_percent),
            self.purchase.calculation_mode,
            self.purchase.active_row,
            block_unit("purchase.unit", &self.purchase.unit),
        );
        let sales = SalesBlock::new(
            block_vat("sales.vat_percent", self.sales.vat_percent),
            self.sales.calculation_mode,
            self.sales.active_row,
            block_unit("sales.unit", &self.sales.unit),
        );

        CostCalculation::from_parts(
            CostCalculation::generate_id(),
            article_id,
            purchase,
            sales,
            now,
        )
    }
}

fn block_vat(field: &str, percent: f64) -> Percentage {
    validate_percentage(field, percent).unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default VAT");
        DEFAULT_VAT_PERCENT
    })
}

fn block_unit(field: &str, unit: &str) -> String {
    validate_price_unit(field, unit).unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default unit");
        DEFAULT_PRICE_UNIT.to_string()
    })
}

impl std::str::FromStr for PricingConfig {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PricingConfig::from_toml_str(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
