//! # glazier-core: Quote Pricing Engine for Glazier Quote
//!
//! This crate turns a glass cutting request into an itemized retail quote.
//! It contains all pricing logic as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Glazier Quote Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Host (glazier-quote CLI, UI)                   │   │
//! │  │   load pricing snapshot ──► collect requests ──► show quote     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &PricingConfiguration, &QuoteRequest   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ glazier-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ validation │─►│ geometry  │─►│  pricing  │─►│  markup   │  │   │
//! │  │   │   rules    │  │ sq ft,    │  │ base,     │  │ tempered, │  │   │
//! │  │   │            │  │ perimeter │  │ edgework  │  │ discount  │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └─────┬─────┘  │   │
//! │  │                                                       ▼        │   │
//! │  │        engine (orchestrates)  ◄────────────────── formula      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCKS • NO GLOBAL STATE • DETERMINISTIC         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Pricing configuration snapshot and table lookups
//! - [`types`] - Request, breakdown and wire result types
//! - [`validation`] - Request checks and business rules
//! - [`geometry`] - Area, billable area and perimeter
//! - [`pricing`] - Component prices from the lookup tables
//! - [`markup`] - Markups, contractor discount and quantity
//! - [`formula`] - Retail formula and the sandboxed expression language
//! - [`engine`] - The quote pipeline
//! - [`sheet`] - Multi-line quote totals
//! - [`money`] - Integer-cent amounts for display and aggregation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use glazier_core::{calculate_quote, PricingConfiguration, QuoteRequest};
//!
//! let config: PricingConfiguration = serde_json::from_str(r#"{
//!     "version": 1,
//!     "glass_costs": [{
//!         "thickness": "1/4", "glass_type": "clear",
//!         "base_cost_per_sq_ft": 4.25, "polish_cost_per_inch": 0.18
//!     }],
//!     "formula": { "mode": "multiplier", "multiplier_value": 2.0 }
//! }"#).unwrap();
//!
//! let result = calculate_quote(&config, &QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"));
//!
//! // 6 sq ft at $4.25, doubled
//! assert_eq!(result.total, 25.5);
//! assert_eq!(result.quote_price, 51.0);
//! assert!(result.error.is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod formula;
pub mod geometry;
pub mod markup;
pub mod money;
pub mod pricing;
pub mod sheet;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{
    ClipSize, FeatureToggles, FormulaConfig, FormulaMode, GlassType, PricingConfiguration,
    Thickness,
};
pub use engine::{calculate_quote, QuoteEngine};
pub use error::{ConfigError, FormulaError, QuoteError, RuleViolation, ValidationError};
pub use money::Money;
pub use sheet::QuoteSheet;
pub use types::{LookupMiss, QuoteBreakdown, QuoteRequest, QuoteResult};
