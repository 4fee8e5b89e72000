//! # Wire Format
//!
//! JSON shapes exchanged with the shop's admin API, and their validated
//! conversion into engine types.
//!
//! ## Conversion Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Wire ◄──► Engine                                   │
//! │                                                                         │
//! │  CostCalculationDto (flat camelCase JSON)                              │
//! │       │  TryFrom: validate tokens, bounds, net + tax == gross and      │
//! │       │           both totals; restore every field as stored           │
//! │       ▼                                                                 │
//! │  CostCalculation  ──── From<&CostCalculation> ────► CostCalculationDto │
//! │                                                                         │
//! │  EditRequest { "op": "purchasePrice", ... }                            │
//! │       │  TryFrom: validate amount / percent / token                    │
//! │       ▼                                                                 │
//! │  Edit ──► CostCalculation::apply                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Legacy Fields
//! Older clients send `purchasePriceCorresponds` / `salesPriceCorresponds` as
//! a boolean (`true` = GROSS, `false` = NET) and the margin fields without the
//! `sales` prefix (`marginNet`, `marginPercent`, ...). Both are accepted on
//! input; output always uses the string token and the prefixed names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::calculation::{CostCalculation, Edit};
use crate::error::{CoreResult, ValidationError};
use crate::purchase::PurchaseBlock;
use crate::sales::SalesBlock;
use crate::types::{CalculationMode, PurchaseActiveRow, SalesActiveRow};
use crate::validation::{
    validate_article_id, validate_money_cents, validate_percentage, validate_price_unit,
    validate_signed_stored_amount, validate_signed_stored_percentage, validate_stored_amount,
    validate_stored_percentage, validate_uuid, validate_vat_rate_ref, ValidationResult,
};
use crate::{DEFAULT_PRICE_UNIT, DEFAULT_VAT_PERCENT};

// =============================================================================
// Net / Gross Choice
// =============================================================================

/// The `*PriceCorresponds` field: a token, or the legacy boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum NetGrossChoice {
    /// Legacy form: `true` means GROSS, `false` means NET.
    Flag(bool),
    /// `"NET"` or `"GROSS"`, case-insensitive.
    Token(String),
}

impl NetGrossChoice {
    /// Resolves to a calculation mode; empty or unknown tokens are rejected.
    pub fn resolve(&self, field: &str) -> ValidationResult<CalculationMode> {
        match self {
            NetGrossChoice::Flag(true) => Ok(CalculationMode::Gross),
            NetGrossChoice::Flag(false) => Ok(CalculationMode::Net),
            NetGrossChoice::Token(token) => parse_token(field, token),
        }
    }
}

impl Default for NetGrossChoice {
    fn default() -> Self {
        CalculationMode::Net.into()
    }
}

impl From<CalculationMode> for NetGrossChoice {
    fn from(mode: CalculationMode) -> Self {
        NetGrossChoice::Token(mode.as_str().to_string())
    }
}

// =============================================================================
// Cost Calculation DTO
// =============================================================================

/// Flat JSON form of a [`CostCalculation`], as stored and served by the shop.
///
/// Missing fields take their defaults; `articleId` has no usable default and
/// must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CostCalculationDto {
    #[ts(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub article_id: i64,

    // Purchase
    pub purchase_price_net: i64,
    pub purchase_price_tax: i64,
    pub purchase_price_gross: i64,
    pub purchase_cost_net: i64,
    pub purchase_cost_tax: i64,
    pub purchase_cost_gross: i64,
    pub purchase_cost_percent: f64,
    pub purchase_total_net: i64,
    pub purchase_total_tax: i64,
    pub purchase_total_gross: i64,
    pub purchase_price_unit: String,
    pub purchase_vat_rate_id: Option<i64>,
    pub purchase_vat_rate_percent: f64,
    pub purchase_calculation_mode: String,
    pub purchase_price_corresponds: NetGrossChoice,
    pub purchase_active_row: String,

    // Sales
    #[serde(alias = "marginNet")]
    pub sales_margin_net: i64,
    #[serde(alias = "marginTax")]
    pub sales_margin_tax: i64,
    #[serde(alias = "marginGross")]
    pub sales_margin_gross: i64,
    #[serde(alias = "marginPercent")]
    pub sales_margin_percent: f64,
    pub sales_total_net: i64,
    pub sales_total_tax: i64,
    pub sales_total_gross: i64,
    pub sales_price_unit: String,
    pub sales_vat_rate_id: Option<i64>,
    pub sales_vat_rate_percent: f64,
    pub sales_calculation_mode: String,
    pub sales_price_corresponds: NetGrossChoice,
    pub sales_active_row: String,

    // Audit
    pub version: i64,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CostCalculationDto {
    fn default() -> Self {
        CostCalculationDto {
            id: None,
            article_id: 0,
            purchase_price_net: 0,
            purchase_price_tax: 0,
            purchase_price_gross: 0,
            purchase_cost_net: 0,
            purchase_cost_tax: 0,
            purchase_cost_gross: 0,
            purchase_cost_percent: 0.0,
            purchase_total_net: 0,
            purchase_total_tax: 0,
            purchase_total_gross: 0,
            purchase_price_unit: DEFAULT_PRICE_UNIT.to_string(),
            purchase_vat_rate_id: None,
            purchase_vat_rate_percent: DEFAULT_VAT_PERCENT.as_f64(),
            purchase_calculation_mode: CalculationMode::Net.as_str().to_string(),
            purchase_price_corresponds: NetGrossChoice::default(),
            purchase_active_row: PurchaseActiveRow::Cost.as_str().to_string(),
            sales_margin_net: 0,
            sales_margin_tax: 0,
            sales_margin_gross: 0,
            sales_margin_percent: 0.0,
            sales_total_net: 0,
            sales_total_tax: 0,
            sales_total_gross: 0,
            sales_price_unit: DEFAULT_PRICE_UNIT.to_string(),
            sales_vat_rate_id: None,
            sales_vat_rate_percent: DEFAULT_VAT_PERCENT.as_f64(),
            sales_calculation_mode: CalculationMode::Net.as_str().to_string(),
            sales_price_corresponds: NetGrossChoice::default(),
            sales_active_row: SalesActiveRow::Margin.as_str().to_string(),
            version: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl CostCalculationDto {
    /// Restores the purchase block exactly as stored.
    fn purchase_block(&self) -> ValidationResult<PurchaseBlock> {
        let mode: CalculationMode =
            parse_token("purchaseCalculationMode", &self.purchase_calculation_mode)?;
        let row: PurchaseActiveRow = parse_token("purchaseActiveRow", &self.purchase_active_row)?;
        let vat = validate_percentage("purchaseVatRatePercent", self.purchase_vat_rate_percent)?;
        let vat_rate_ref = validate_vat_rate_ref("purchaseVatRateId", self.purchase_vat_rate_id)?;
        let unit = validate_price_unit("purchasePriceUnit", &self.purchase_price_unit)?;
        let price_corresponds = self
            .purchase_price_corresponds
            .resolve("purchasePriceCorresponds")?;

        let price = validate_stored_amount(
            "purchasePrice",
            self.purchase_price_net,
            self.purchase_price_tax,
            self.purchase_price_gross,
        )?;
        let cost = validate_stored_amount(
            "purchaseCost",
            self.purchase_cost_net,
            self.purchase_cost_tax,
            self.purchase_cost_gross,
        )?;
        let cost_percent =
            validate_stored_percentage("purchaseCostPercent", self.purchase_cost_percent)?;
        let total = validate_stored_amount(
            "purchaseTotal",
            self.purchase_total_net,
            self.purchase_total_tax,
            self.purchase_total_gross,
        )?;

        let block = PurchaseBlock::new(vat, mode, row, unit)
            .with_amounts(price, cost, cost_percent, total, vat_rate_ref)
            .with_price_corresponds(price_corresponds);
        if !block.is_additive() {
            return Err(ValidationError::InvalidFormat {
                field: "purchaseTotal".to_string(),
                reason: "must equal purchase price + cost".to_string(),
            });
        }

        Ok(block)
    }

    /// Restores the sales block exactly as stored; the aggregate checks it
    /// against the purchase total.
    fn sales_block(&self) -> ValidationResult<SalesBlock> {
        let mode: CalculationMode =
            parse_token("salesCalculationMode", &self.sales_calculation_mode)?;
        let row: SalesActiveRow = parse_token("salesActiveRow", &self.sales_active_row)?;
        let vat = validate_percentage("salesVatRatePercent", self.sales_vat_rate_percent)?;
        let vat_rate_ref = validate_vat_rate_ref("salesVatRateId", self.sales_vat_rate_id)?;
        let unit = validate_price_unit("salesPriceUnit", &self.sales_price_unit)?;
        let total_corresponds = self
            .sales_price_corresponds
            .resolve("salesPriceCorresponds")?;

        let margin = validate_signed_stored_amount(
            "salesMargin",
            self.sales_margin_net,
            self.sales_margin_tax,
            self.sales_margin_gross,
        )?;
        let margin_percent =
            validate_signed_stored_percentage("salesMarginPercent", self.sales_margin_percent)?;
        let total = validate_signed_stored_amount(
            "salesTotal",
            self.sales_total_net,
            self.sales_total_tax,
            self.sales_total_gross,
        )?;

        Ok(SalesBlock::new(vat, mode, row, unit)
            .with_amounts(margin, margin_percent, total, vat_rate_ref)
            .with_total_corresponds(total_corresponds))
    }
}

impl TryFrom<CostCalculationDto> for CostCalculation {
    type Error = ValidationError;

    fn try_from(dto: CostCalculationDto) -> Result<Self, Self::Error> {
        let id = match dto.id.as_deref() {
            Some(id) => validate_uuid("id", id)?,
            None => CostCalculation::generate_id(),
        };
        let article_id = validate_article_id("articleId", dto.article_id)?;
        if dto.version < 0 {
            return Err(ValidationError::OutOfRange {
                field: "version".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        let purchase = dto.purchase_block()?;
        let sales = dto.sales_block()?;
        if sales.total() != purchase.total() + sales.margin() {
            return Err(ValidationError::InvalidFormat {
                field: "salesTotal".to_string(),
                reason: "must equal purchase total + sales margin".to_string(),
            });
        }

        let created_at = dto.created_at.unwrap_or_else(Utc::now);
        let updated_at = dto.updated_at.unwrap_or(created_at);

        Ok(
            CostCalculation::from_parts(id, article_id, purchase, sales, created_at)
                .with_audit(dto.version, updated_at),
        )
    }
}

impl From<CostCalculation> for CostCalculationDto {
    fn from(calc: CostCalculation) -> Self {
        CostCalculationDto::from(&calc)
    }
}

impl From<&CostCalculation> for CostCalculationDto {
    fn from(calc: &CostCalculation) -> Self {
        let purchase = calc.purchase();
        let sales = calc.sales();

        CostCalculationDto {
            id: Some(calc.id().to_string()),
            article_id: calc.article_id(),
            purchase_price_net: purchase.price().net.cents(),
            purchase_price_tax: purchase.price().tax.cents(),
            purchase_price_gross: purchase.price().gross.cents(),
            purchase_cost_net: purchase.cost().net.cents(),
            purchase_cost_tax: purchase.cost().tax.cents(),
            purchase_cost_gross: purchase.cost().gross.cents(),
            purchase_cost_percent: purchase.cost_percent().as_f64(),
            purchase_total_net: purchase.total().net.cents(),
            purchase_total_tax: purchase.total().tax.cents(),
            purchase_total_gross: purchase.total().gross.cents(),
            purchase_price_unit: purchase.price_unit().to_string(),
            purchase_vat_rate_id: purchase.vat_rate_ref().map(|r| r.0),
            purchase_vat_rate_percent: purchase.vat_percent().as_f64(),
            purchase_calculation_mode: purchase.calculation_mode().as_str().to_string(),
            purchase_price_corresponds: purchase.price_corresponds().into(),
            purchase_active_row: purchase.active_row().as_str().to_string(),
            sales_margin_net: sales.margin().net.cents(),
            sales_margin_tax: sales.margin().tax.cents(),
            sales_margin_gross: sales.margin().gross.cents(),
            sales_margin_percent: sales.margin_percent().as_f64(),
            sales_total_net: sales.total().net.cents(),
            sales_total_tax: sales.total().tax.cents(),
            sales_total_gross: sales.total().gross.cents(),
            sales_price_unit: sales.total_unit().to_string(),
            sales_vat_rate_id: sales.vat_rate_ref().map(|r| r.0),
            sales_vat_rate_percent: sales.vat_percent().as_f64(),
            sales_calculation_mode: sales.calculation_mode().as_str().to_string(),
            sales_price_corresponds: sales.total_corresponds().into(),
            sales_active_row: sales.active_row().as_str().to_string(),
            version: calc.version(),
            created_at: Some(calc.created_at()),
            updated_at: Some(calc.updated_at()),
        }
    }
}

// =============================================================================
// Edit Request
// =============================================================================

/// One edit as sent by the admin UI, tagged by `op`.
///
/// ## Example
/// ```json
/// { "op": "purchasePrice", "side": "GROSS", "amount": 1190 }
/// { "op": "salesMarginPercent", "percent": 25.5 }
/// { "op": "purchaseVat", "percent": 7.0, "vatRateId": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditRequest {
    PurchasePrice {
        side: String,
        amount: i64,
    },
    PurchaseCost {
        side: String,
        amount: i64,
    },
    PurchaseCostPercent {
        percent: f64,
    },
    PurchaseVat {
        percent: f64,
        #[serde(rename = "vatRateId")]
        vat_rate_id: Option<i64>,
    },
    PurchaseCalculationMode {
        mode: String,
    },
    PurchaseActiveRow {
        row: String,
    },
    PurchasePriceUnit {
        unit: String,
    },
    SalesMargin {
        side: String,
        amount: i64,
    },
    SalesMarginPercent {
        percent: f64,
    },
    SalesTotal {
        side: String,
        amount: i64,
    },
    SalesVat {
        percent: f64,
        #[serde(rename = "vatRateId")]
        vat_rate_id: Option<i64>,
    },
    SalesCalculationMode {
        mode: String,
    },
    SalesActiveRow {
        row: String,
    },
    SalesTotalUnit {
        unit: String,
    },
}

impl TryFrom<EditRequest> for Edit {
    type Error = ValidationError;

    fn try_from(request: EditRequest) -> Result<Self, Self::Error> {
        let edit = match request {
            EditRequest::PurchasePrice { side, amount } => Edit::PurchasePrice {
                side: parse_token("side", &side)?,
                amount: validate_money_cents("amount", amount)?,
            },
            EditRequest::PurchaseCost { side, amount } => Edit::PurchaseCost {
                side: parse_token("side", &side)?,
                amount: validate_money_cents("amount", amount)?,
            },
            EditRequest::PurchaseCostPercent { percent } => Edit::PurchaseCostPercent {
                percent: validate_percentage("percent", percent)?,
            },
            EditRequest::PurchaseVat {
                percent,
                vat_rate_id,
            } => Edit::PurchaseVat {
                percent: validate_percentage("percent", percent)?,
                vat_rate_ref: validate_vat_rate_ref("vatRateId", vat_rate_id)?,
            },
            EditRequest::PurchaseCalculationMode { mode } => Edit::PurchaseCalculationMode {
                mode: parse_token("mode", &mode)?,
            },
            EditRequest::PurchaseActiveRow { row } => Edit::PurchaseActiveRow {
                row: parse_token("row", &row)?,
            },
            EditRequest::PurchasePriceUnit { unit } => Edit::PurchasePriceUnit {
                unit: validate_price_unit("unit", &unit)?,
            },
            EditRequest::SalesMargin { side, amount } => Edit::SalesMargin {
                side: parse_token("side", &side)?,
                amount: validate_money_cents("amount", amount)?,
            },
            EditRequest::SalesMarginPercent { percent } => Edit::SalesMarginPercent {
                percent: validate_percentage("percent", percent)?,
            },
            EditRequest::SalesTotal { side, amount } => Edit::SalesTotal {
                side: parse_token("side", &side)?,
                amount: validate_money_cents("amount", amount)?,
            },
            EditRequest::SalesVat {
                percent,
                vat_rate_id,
            } => Edit::SalesVat {
                percent: validate_percentage("percent", percent)?,
                vat_rate_ref: validate_vat_rate_ref("vatRateId", vat_rate_id)?,
            },
            EditRequest::SalesCalculationMode { mode } => Edit::SalesCalculationMode {
                mode: parse_token("mode", &mode)?,
            },
            EditRequest::SalesActiveRow { row } => Edit::SalesActiveRow {
                row: parse_token("row", &row)?,
            },
            EditRequest::SalesTotalUnit { unit } => Edit::SalesTotalUnit {
                unit: validate_price_unit("unit", &unit)?,
            },
        };

        Ok(edit)
    }
}

// =============================================================================
// JSON Helpers
// =============================================================================

/// Parses and validates a stored or submitted calculation.
pub fn parse_calculation(json: &str) -> CoreResult<CostCalculation> {
    let dto: CostCalculationDto = serde_json::from_str(json)?;
    Ok(CostCalculation::try_from(dto)?)
}

/// Serializes a calculation in its wire form.
pub fn calculation_to_json(calc: &CostCalculation) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(&CostCalculationDto::from(calc))?)
}

/// Parses and validates a JSON array of edit requests.
///
/// The first invalid edit rejects the whole batch.
pub fn parse_edits(json: &str) -> CoreResult<Vec<Edit>> {
    let requests: Vec<EditRequest> = serde_json::from_str(json)?;
    let edits = requests
        .into_iter()
        .map(Edit::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(edits)
}

// =============================================================================
// Helpers
// =============================================================================

/// Parses an enum token, reporting errors under the wire field name.
fn parse_token<T>(field: &str, value: &str) -> ValidationResult<T>
where
    T: FromStr<Err = ValidationError>,
{
    value.parse::<T>().map_err(|err| match err {
        ValidationError::InvalidEnum { value, allowed, .. } => ValidationError::InvalidEnum {
            field: field.to_string(),
            value,
            allowed,
        },
        other => other,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Money;
    use crate::types::Percentage;

    fn minimal(extra: &str) -> String {
        format!(r#"{{ "articleId": 42 {extra} }}"#)
    }

    #[test]
    fn test_minimal_payload_uses_defaults() {
        let calc = parse_calculation(&minimal("")).unwrap();
        assert_eq!(calc.article_id(), 42);
        assert_eq!(calc.purchase().vat_percent(), Percentage::from_whole(19));
        assert_eq!(calc.sales().active_row(), SalesActiveRow::Margin);
        assert!(calc.is_consistent());
    }

    #[test]
    fn test_missing_article_id_rejected() {
        let err = parse_calculation("{}").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "articleId"
        ));
    }

    #[test]
    fn test_legacy_boolean_corresponds() {
        let calc = parse_calculation(&minimal(
            r#", "purchasePriceCorresponds": true, "salesPriceCorresponds": false"#,
        ))
        .unwrap();
        assert_eq!(calc.purchase().price_corresponds(), CalculationMode::Gross);
        assert_eq!(calc.sales().total_corresponds(), CalculationMode::Net);

        let calc = parse_calculation(&minimal(r#", "purchasePriceCorresponds": "gross""#)).unwrap();
        assert_eq!(calc.purchase().price_corresponds(), CalculationMode::Gross);

        let err = parse_calculation(&minimal(r#", "purchasePriceCorresponds": """#)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidEnum { ref field, .. })
                if field == "purchasePriceCorresponds"
        ));
    }

    #[test]
    fn test_margin_aliases() {
        let calc = parse_calculation(&minimal(
            r#", "purchasePriceNet": 1000, "purchasePriceTax": 190, "purchasePriceGross": 1190,
                 "purchaseTotalNet": 1000, "purchaseTotalTax": 190, "purchaseTotalGross": 1190,
                 "marginNet": 250, "marginTax": 48, "marginGross": 298, "marginPercent": 25.0,
                 "salesTotalNet": 1250, "salesTotalTax": 238, "salesTotalGross": 1488"#,
        ))
        .unwrap();
        assert_eq!(calc.sales().margin().gross.cents(), 298);
        assert_eq!(calc.sales().margin_percent(), Percentage::from_whole(25));
        assert_eq!(calc.sales().total().net.cents(), 1250);
    }

    #[test]
    fn test_inconsistent_amounts_rejected() {
        let cases = [
            (r#", "purchasePriceNet": 1000"#, "purchasePriceTax"),
            (
                r#", "purchasePriceNet": 1000, "purchasePriceTax": 190, "purchasePriceGross": 1190"#,
                "purchaseTotal",
            ),
            (r#", "salesTotalNet": 5, "salesTotalGross": 5"#, "salesTotal"),
            (r#", "marginNet": -3, "marginGross": -3"#, "salesTotal"),
        ];

        for (extra, expected) in cases {
            match parse_calculation(&minimal(extra)) {
                Err(CoreError::Validation(ValidationError::InvalidFormat { field, .. })) => {
                    assert_eq!(field, expected, "{extra}");
                }
                other => panic!("{extra}: expected format error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_reload_keeps_rounded_amounts() {
        let margin_typed_gross = CostCalculation::new(1)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(1000),
            })
            .apply(Edit::SalesMargin {
                side: CalculationMode::Gross,
                amount: Money::from_cents(3),
            })
            .apply(Edit::SalesCalculationMode {
                mode: CalculationMode::Net,
            });
        let total_then_margin_row = CostCalculation::new(2)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(3),
            })
            .apply(Edit::SalesTotal {
                side: CalculationMode::Net,
                amount: Money::from_cents(6),
            })
            .apply(Edit::SalesActiveRow {
                row: SalesActiveRow::Margin,
            });
        let percent_then_gross_mode = CostCalculation::new(3)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(999),
            })
            .apply(Edit::PurchaseCostPercent {
                percent: Percentage::from_whole(10),
            })
            .apply(Edit::PurchaseCalculationMode {
                mode: CalculationMode::Gross,
            });

        for calc in [margin_typed_gross, total_then_margin_row, percent_then_gross_mode] {
            let reloaded = parse_calculation(&calculation_to_json(&calc).unwrap()).unwrap();
            assert_eq!(reloaded, calc);
        }
    }

    #[test]
    fn test_reload_after_switching_to_large_ratio() {
        let cost_heavy = CostCalculation::new(1)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(10),
            })
            .apply(Edit::PurchaseCost {
                side: CalculationMode::Net,
                amount: Money::from_cents(100_000),
            })
            .apply(Edit::PurchaseActiveRow {
                row: PurchaseActiveRow::CostPercent,
            });
        assert_eq!(cost_heavy.purchase().cost_percent().hundredths(), 100_000_000);

        let margin_heavy = CostCalculation::new(2)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(100),
            })
            .apply(Edit::SalesTotal {
                side: CalculationMode::Net,
                amount: Money::from_cents(200_000),
            })
            .apply(Edit::SalesActiveRow {
                row: SalesActiveRow::MarginPercent,
            });
        assert_eq!(margin_heavy.sales().margin_percent().hundredths(), 19_990_000);

        for calc in [cost_heavy, margin_heavy] {
            let reloaded = parse_calculation(&calculation_to_json(&calc).unwrap()).unwrap();
            assert_eq!(reloaded, calc);
        }
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let cases = [
            (r#", "salesActiveRow": "discount""#, "salesActiveRow"),
            (r#", "purchaseCalculationMode": "brutto""#, "purchaseCalculationMode"),
            (r#", "purchasePriceNet": -1"#, "purchasePriceNet"),
            (r#", "purchaseVatRatePercent": 19.123"#, "purchaseVatRatePercent"),
            (r#", "salesPriceUnit": "  ""#, "salesPriceUnit"),
            (r#", "id": "not-a-uuid""#, "id"),
        ];

        for (extra, expected) in cases {
            match parse_calculation(&minimal(extra)) {
                Err(CoreError::Validation(err)) => {
                    assert!(err.to_string().starts_with(expected), "{extra}: {err}");
                }
                other => panic!("{extra}: expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_negative_margin_survives_reload() {
        let calc = CostCalculation::new(1)
            .apply(Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(1000),
            })
            .apply(Edit::SalesTotal {
                side: CalculationMode::Net,
                amount: Money::from_cents(900),
            })
            .apply(Edit::SalesActiveRow {
                row: SalesActiveRow::Margin,
            });

        let json = calculation_to_json(&calc).unwrap();
        let reloaded = parse_calculation(&json).unwrap();
        assert_eq!(reloaded.sales().margin().net.cents(), -100);
        assert_eq!(reloaded, calc);
    }

    #[test]
    fn test_output_uses_tokens() {
        let calc = CostCalculation::new(3).apply(Edit::PurchaseCostPercent {
            percent: Percentage::from_whole(5),
        });
        let value = serde_json::to_value(CostCalculationDto::from(&calc)).unwrap();
        assert_eq!(value["purchaseActiveRow"], "costPercent");
        assert_eq!(value["purchasePriceCorresponds"], "NET");
        assert_eq!(value["purchaseCostPercent"], 5.0);
        assert_eq!(value["salesMarginNet"], 0);
        assert!(value.get("marginNet").is_none());
    }

    #[test]
    fn test_parse_edits() {
        let edits = parse_edits(
            r#"[
                { "op": "purchasePrice", "side": "NET", "amount": 1000 },
                { "op": "purchaseVat", "percent": 7.0, "vatRateId": 2 },
                { "op": "salesActiveRow", "row": "margin_percent" },
                { "op": "salesMarginPercent", "percent": 50 }
            ]"#,
        )
        .unwrap();

        assert_eq!(edits.len(), 4);
        assert_eq!(
            edits[0],
            Edit::PurchasePrice {
                side: CalculationMode::Net,
                amount: Money::from_cents(1000)
            }
        );
        assert!(matches!(
            edits[1],
            Edit::PurchaseVat {
                vat_rate_ref: Some(_),
                ..
            }
        ));
        assert_eq!(
            edits[2],
            Edit::SalesActiveRow {
                row: SalesActiveRow::MarginPercent
            }
        );
    }

    #[test]
    fn test_parse_edits_rejects_bad_values() {
        assert!(matches!(
            parse_edits(r#"[{ "op": "salesTotal", "side": "NET", "amount": -5 }]"#),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            parse_edits(r#"[{ "op": "salesDiscount", "percent": 5 }]"#),
            Err(CoreError::Json(_))
        ));
        assert!(matches!(
            parse_edits(r#"[{ "op": "purchaseCost", "side": "", "amount": 5 }]"#),
            Err(CoreError::Validation(ValidationError::InvalidEnum { .. }))
        ));
    }
}
