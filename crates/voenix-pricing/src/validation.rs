//! # Validation Module
//!
//! Boundary checks for values entering the pricing engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin UI                                                     │
//! │  ├── Input masks (two decimals, no letters)                            │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Wire adapters (dto.rs, config.rs)                            │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: ranges, scales, tokens                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine (purchase.rs, sales.rs)                               │
//! │  └── Total functions, never fail on validated input                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use voenix_pricing::validation::{validate_money_cents, validate_percentage};
//!
//! let price = validate_money_cents("purchasePriceNet", 1099).unwrap();
//! assert_eq!(price.cents(), 1099);
//!
//! let vat = validate_percentage("purchaseVatRatePercent", 19.0).unwrap();
//! assert_eq!(vat.hundredths(), 1900);
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::tax::TaxedAmount;
use crate::types::{Percentage, VatRateRef};
use crate::{MAX_MONEY_CENTS, MAX_STORED_CENTS, MAX_UNIT_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest deviation from a two-decimal value still accepted as float noise.
const PERCENT_SCALE_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a typed monetary amount in cents.
///
/// ## Rules
/// - Must be between 0 and [`MAX_MONEY_CENTS`] (precision 12, scale 2)
///
/// Derived amounts such as a negative margin never pass through here.
pub fn validate_money_cents(field: &str, cents: i64) -> ValidationResult<Money> {
    if !(0..=MAX_MONEY_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_CENTS,
        });
    }

    Ok(Money::from_cents(cents))
}

/// Validates a stored net / tax / gross triple.
///
/// ## Rules
/// - Net and gross between 0 and [`MAX_STORED_CENTS`]
/// - `net + tax == gross`
///
/// Stored amounts are engine output, not typed input, so they are held to the
/// wider stored bound. The triple is kept exactly as given.
pub fn validate_stored_amount(
    prefix: &str,
    net: i64,
    tax: i64,
    gross: i64,
) -> ValidationResult<TaxedAmount> {
    stored_amount_in_range(prefix, net, tax, gross, 0)
}

/// Like [`validate_stored_amount`], for a margin or sales total.
///
/// A margin derived under the `total` row goes negative when the total is
/// below the purchase total, and stays that way if the row is switched.
pub fn validate_signed_stored_amount(
    prefix: &str,
    net: i64,
    tax: i64,
    gross: i64,
) -> ValidationResult<TaxedAmount> {
    stored_amount_in_range(prefix, net, tax, gross, -MAX_STORED_CENTS)
}

fn stored_amount_in_range(
    prefix: &str,
    net: i64,
    tax: i64,
    gross: i64,
    min: i64,
) -> ValidationResult<TaxedAmount> {
    let net = stored_cents(&format!("{prefix}Net"), net, min)?;
    let gross = stored_cents(&format!("{prefix}Gross"), gross, min)?;

    // both sides are bounded, so the difference cannot overflow
    let amount = TaxedAmount {
        net,
        tax: gross - net,
        gross,
    };
    if amount.tax.cents() != tax {
        return Err(ValidationError::InvalidFormat {
            field: format!("{prefix}Tax"),
            reason: format!("must equal {prefix}Gross - {prefix}Net"),
        });
    }

    Ok(amount)
}

fn stored_cents(field: &str, cents: i64, min: i64) -> ValidationResult<Money> {
    if !(min..=MAX_STORED_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max: MAX_STORED_CENTS,
        });
    }

    Ok(Money::from_cents(cents))
}

// =============================================================================
// Percentage Validators
// =============================================================================

/// Validates a typed percentage given as a decimal number (`19.5` = 19.5 %).
///
/// ## Rules
/// - Must be finite
/// - Must have at most two decimals
/// - Must be between 0 and 999.99
///
/// ## Example
/// ```rust
/// use voenix_pricing::validation::validate_percentage;
///
/// assert_eq!(validate_percentage("vat", 7.0).unwrap().hundredths(), 700);
/// assert_eq!(validate_percentage("vat", 36.36).unwrap().hundredths(), 3636);
/// assert!(validate_percentage("vat", 12.345).is_err());
/// assert!(validate_percentage("vat", f64::NAN).is_err());
/// assert!(validate_percentage("vat", -1.0).is_err());
/// ```
pub fn validate_percentage(field: &str, value: f64) -> ValidationResult<Percentage> {
    percentage_in_range(field, value, 0, Percentage::MAX.hundredths())
}

/// Validates a stored cost percentage, up to [`Percentage::MAX_STORED`].
///
/// A derived ratio is not limited to 999.99 %: a cost of 1,000.00 € on a
/// price of 0.10 € is stored as 1,000,000 %.
pub fn validate_stored_percentage(field: &str, value: f64) -> ValidationResult<Percentage> {
    percentage_in_range(field, value, 0, Percentage::MAX_STORED.hundredths())
}

/// Like [`validate_stored_percentage`], but negative margins are allowed.
pub fn validate_signed_stored_percentage(field: &str, value: f64) -> ValidationResult<Percentage> {
    let max = Percentage::MAX_STORED.hundredths();
    percentage_in_range(field, value, -max, max)
}

fn percentage_in_range(field: &str, value: f64, min: i64, max: i64) -> ValidationResult<Percentage> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    let scaled = value * 100.0;
    let hundredths = scaled.round();
    // large stored ratios carry float noise proportional to their size
    let tolerance = PERCENT_SCALE_TOLERANCE.max(scaled.abs() * 4.0 * f64::EPSILON);
    if (scaled - hundredths).abs() > tolerance {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must have at most two decimals".to_string(),
        });
    }

    if hundredths < min as f64 || hundredths > max as f64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }

    Ok(Percentage::from_hundredths(hundredths as i64))
}

// =============================================================================
// Reference Validators
// =============================================================================

/// Validates an optional VAT master-data id.
///
/// ## Rules
/// - Absent is fine (custom rate typed by hand)
/// - When present, must be positive
pub fn validate_vat_rate_ref(field: &str, id: Option<i64>) -> ValidationResult<Option<VatRateRef>> {
    match id {
        None => Ok(None),
        Some(id) if id > 0 => Ok(Some(VatRateRef(id))),
        Some(_) => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::MAX,
        }),
    }
}

/// Validates an article id.
pub fn validate_article_id(field: &str, id: i64) -> ValidationResult<i64> {
    if id <= 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    Ok(id)
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use voenix_pricing::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(id.to_string())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display unit such as `PER_PIECE`.
///
/// ## Rules
/// - Trimmed, must not be empty
/// - At most [`MAX_UNIT_LEN`] characters
pub fn validate_price_unit(field: &str, unit: &str) -> ValidationResult<String> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_UNIT_LEN,
        });
    }

    Ok(unit.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
