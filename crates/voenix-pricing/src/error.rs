//! # Error Types
//!
//! Error types for the pricing boundary.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  voenix-pricing errors (this file)                                     │
//! │  ├── CoreError        - Boundary failures (JSON, config, validation)   │
//! │  └── ValidationError  - Input rejected before reaching the engine      │
//! │                                                                         │
//! │  The recomputation functions themselves never fail: a price of zero    │
//! │  while deriving a percentage yields 0%, not an error.                  │
//! │                                                                         │
//! │  Flow: JSON ──► ValidationError ──► CoreError ──► HTTP layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending field name in every message
//! 3. A rejected edit leaves the calculation untouched

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors surfaced by the boundary adapters of this crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (range or enum token).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Payload is not valid JSON for the expected shape.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration text could not be parsed.
    #[error("Invalid pricing configuration: {0}")]
    Config(#[from] toml::de::Error),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised by the boundary layer (DTO conversion, edit requests,
/// config overrides) before any value reaches the recomputation functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Monetary or percentage value is outside its bounds.
    ///
    /// Percentages are reported in hundredths (`99999` = 999.99 %).
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value has an invalid shape (NaN, more than two decimals, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Unrecognised enumeration token (mode, active row, net/gross flag).
    #[error("{field} has unknown value '{value}', expected one of: {allowed:?}")]
    InvalidEnum {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl ValidationError {
    /// Creates an InvalidEnum error from a static list of accepted tokens.
    pub fn invalid_enum(field: impl Into<String>, value: impl Into<String>, allowed: &[&str]) -> Self {
        ValidationError::InvalidEnum {
            field: field.into(),
            value: value.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
