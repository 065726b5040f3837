//! # Error Types
//!
//! Domain-specific error types for glazier-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  glazier-core errors (this file)                                       │
//! │  ├── QuoteError       - Why a quote was rejected (caller-visible)      │
//! │  │   ├── ValidationError - Malformed request (missing dims, qty 0)     │
//! │  │   └── RuleViolation   - Valid request, forbidden combination        │
//! │  ├── FormulaError     - Custom formula rejected (never caller-visible) │
//! │  └── ConfigError      - Structural problem in a pricing snapshot       │
//! │                                                                         │
//! │  glazier-quote errors (app)                                            │
//! │  └── AppError         - File, parse and config load failures           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (thickness, glass type, field)
//! 3. Errors are enum variants, never String
//! 4. Each rejection variant maps to a user-facing message

use thiserror::Error;

use crate::config::{ClipSize, GlassType, Thickness};

// =============================================================================
// Quote Error
// =============================================================================

/// Reasons a quote request is rejected.
///
/// The message of this error is what ends up in `QuoteResult::error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// The request itself is malformed.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The request asks for a combination the shop cannot produce.
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These catch requests that cannot be priced at all, before any business
/// rule runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

// =============================================================================
// Rule Violation
// =============================================================================

/// Business rule violations, in the order the validator checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("{thickness} glass cannot be tempered")]
    ThinGlassTempered { thickness: Thickness },

    #[error("{thickness} glass cannot be polished")]
    ThinGlassPolished { thickness: Thickness },

    #[error("{thickness} glass cannot be beveled")]
    ThinGlassBeveled { thickness: Thickness },

    #[error("{thickness} is not available in mirror")]
    ThinMirror { thickness: Thickness },

    #[error("Mirror cannot be tempered")]
    MirrorTempered,

    #[error("Clipped corners are not available for mirror")]
    MirrorClippedCorners,

    #[error("Clipped corners are not available on circular pieces")]
    CircularClippedCorners,
}

// =============================================================================
// Formula Error
// =============================================================================

/// Custom formula failures.
///
/// These never reach the caller as a rejected quote. The formula evaluator
/// logs them and prices with the divisor formula instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("custom formula mode selected but no expression configured")]
    MissingExpression,

    #[error("expression is empty")]
    Empty,

    #[error("expression is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("malformed number '{text}' at offset {offset}")]
    BadNumber { text: String, offset: usize },

    #[error("unknown name '{name}' at offset {offset}")]
    UnknownName { name: String, offset: usize },

    #[error("'{name}' is a function and must be called")]
    BareFunction { name: String },

    #[error("'{name}' is not a function")]
    NotCallable { name: String },

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        offset: usize,
    },

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("result {value} is not a finite, non-negative price")]
    InvalidResult { value: f64 },
}

// =============================================================================
// Config Error
// =============================================================================

/// Structural problems in a pricing configuration snapshot.
///
/// Reported by [`crate::config::PricingConfiguration::validate`]. The engine
/// itself never rejects a quote because of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("duplicate glass cost entry for {thickness} {glass_type}")]
    DuplicateGlassCost {
        thickness: Thickness,
        glass_type: GlassType,
    },

    #[error("duplicate clipped corner cost for {thickness} {clip_size}")]
    DuplicateClippedCornerCost {
        thickness: Thickness,
        clip_size: ClipSize,
    },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("unknown formula mode '{0}'. Valid options: divisor, multiplier, custom")]
    UnknownFormulaMode(String),

    #[error("invalid custom formula: {0}")]
    Formula(#[from] FormulaError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for quote results.
pub type QuoteOutcome<T> = Result<T, QuoteError>;

/// Convenience type alias for config validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
