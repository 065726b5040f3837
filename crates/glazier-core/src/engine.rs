//! # Quote Engine
//!
//! Sequences the pricing stages and assembles the itemized result. This is
//! the only part of the crate a host needs to call.
//!
//! ## Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Quote Pipeline                                  │
//! │                                                                         │
//! │  QuoteRequest                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate ──────── error ──────────────────────────► Rejected        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Geometry            area, billable area, perimeter                  │
//! │       ▼                                                                 │
//! │  3. Component pricing   base, polish, bevel, clipped corners            │
//! │       ▼                                                                 │
//! │  4. Markups & discount  tempered, shape, contractor, × quantity         │
//! │       ▼                                                                 │
//! │  5. Formula             divisor | multiplier | custom (never fails)     │
//! │       │                                                                 │
//! │       ├──── any figure overflowed to inf/NaN ─────────► Rejected        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Success (QuoteBreakdown)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The engine only borrows an immutable configuration snapshot and has no
//! other state, so it is `Send + Sync` and can price line items from many
//! threads at once. Give each call the snapshot that was current when the
//! quote was started; the engine never re-reads configuration.

use tracing::debug;

use crate::config::PricingConfiguration;
use crate::error::QuoteOutcome;
use crate::formula::RetailFormula;
use crate::geometry::compute_geometry;
use crate::markup::apply_markups;
use crate::pricing::resolve_components;
use crate::types::{QuoteBreakdown, QuoteRequest, QuoteResult};
use crate::validation::{ensure_finite, validate_request, validate_request_rules};

/// Prices quote requests against one configuration snapshot.
///
/// ## Example
/// ```rust
/// use glazier_core::{PricingConfiguration, QuoteEngine, QuoteRequest};
///
/// let config = PricingConfiguration::default();
/// let engine = QuoteEngine::new(&config);
///
/// let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/8", "clear");
/// request.is_tempered = true;
///
/// let err = engine.quote(&request).unwrap_err();
/// assert_eq!(err.to_string(), "1/8 glass cannot be tempered");
/// ```
#[derive(Debug, Clone)]
pub struct QuoteEngine<'a> {
    config: &'a PricingConfiguration,
    formula: RetailFormula,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(config: &'a PricingConfiguration) -> Self {
        QuoteEngine {
            config,
            formula: RetailFormula::from_config(&config.formula),
        }
    }

    pub fn config(&self) -> &'a PricingConfiguration {
        self.config
    }

    /// Prices one request.
    pub fn quote(&self, request: &QuoteRequest) -> QuoteOutcome<QuoteBreakdown> {
        let config = self.config;

        let shape = validate_request(request)?;
        validate_request_rules(request, shape)?;

        let geometry = compute_geometry(shape, config.settings.minimum_billable_sq_ft);
        ensure_finite("area", geometry.billable_sq_ft)?;
        ensure_finite("perimeter", geometry.perimeter_inches)?;
        debug!(
            config_version = config.version,
            actual_sq_ft = geometry.actual_sq_ft,
            billable_sq_ft = geometry.billable_sq_ft,
            perimeter_inches = geometry.perimeter_inches,
            "Computed geometry"
        );

        let components = resolve_components(config, request, &geometry);
        let before_markups = ensure_finite("subtotal", components.before_markups())?;

        let markups = apply_markups(config, request, shape, before_markups);
        ensure_finite("total", markups.total)?;
        debug!(
            before_markups,
            subtotal = markups.subtotal,
            total = markups.total,
            "Applied markups"
        );

        let outcome = self.formula.apply(markups.total);
        let quote_price = ensure_finite("quote_price", outcome.quote_price)?;

        Ok(QuoteBreakdown {
            actual_sq_ft: geometry.actual_sq_ft,
            billable_sq_ft: geometry.billable_sq_ft,
            perimeter_inches: geometry.perimeter_inches,
            minimum_charge_applied: geometry.minimum_charge_applied(),
            base_price: components.base_price,
            polish_price: components.polish_price,
            beveled_price: components.beveled_price,
            clipped_corners_price: components.clipped_corners_price,
            before_markups_subtotal: before_markups,
            tempered_price: markups.tempered_price,
            shape_price: markups.shape_price,
            subtotal: markups.subtotal,
            contractor_discount: markups.contractor_discount,
            discounted_subtotal: markups.discounted_subtotal,
            quantity: request.quantity,
            total: markups.total,
            quote_price,
            formula_fallback: outcome.fallback.is_some(),
            lookup_misses: components.lookup_misses,
        })
    }

    /// Prices one request into the host wire format.
    pub fn quote_result(&self, request: &QuoteRequest) -> QuoteResult {
        let outcome = self.quote(request);
        if let Err(err) = &outcome {
            debug!(error = %err, "Quote rejected");
        }
        outcome.into()
    }

    /// Prices several line items, one result per request, in order.
    pub fn quote_all<'r>(&self, requests: impl IntoIterator<Item = &'r QuoteRequest>) -> Vec<QuoteResult> {
        requests
            .into_iter()
            .map(|request| self.quote_result(request))
            .collect()
    }
}

/// Prices one request against a configuration snapshot.
///
/// This is the host-facing entry point: it never panics and always returns
/// either a complete result or an error-only result.
pub fn calculate_quote(config: &PricingConfiguration, request: &QuoteRequest) -> QuoteResult {
    QuoteEngine::new(config).quote_result(request)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormulaMode;
    use crate::error::{QuoteError, RuleViolation, ValidationError};
    use crate::test_support::sample_config;

    #[test]
    fn test_plain_rectangle() {
        let config = sample_config();
        let engine = QuoteEngine::new(&config);
        let b = engine
            .quote(&QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"))
            .unwrap();

        assert_eq!(b.actual_sq_ft, 6.0);
        assert_eq!(b.billable_sq_ft, 6.0);
        assert!(!b.minimum_charge_applied);
        assert_eq!(b.base_price, 25.5);
        assert_eq!(b.before_markups_subtotal, 25.5);
        assert_eq!(b.subtotal, 25.5);
        assert_eq!(b.total, 25.5);
        assert_eq!(b.quote_price, 25.5 / 0.28);
        assert_eq!(b.quote_price_money().cents(), 9107);
    }

    #[test]
    fn test_validation_runs_before_pricing() {
        let config = sample_config();
        let engine = QuoteEngine::new(&config);

        let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "mirror");
        request.is_tempered = true;
        assert_eq!(
            engine.quote(&request),
            Err(QuoteError::Rule(RuleViolation::MirrorTempered))
        );

        let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear");
        request.quantity = 0;
        assert_eq!(
            engine.quote(&request),
            Err(QuoteError::Invalid(ValidationError::MustBePositive {
                field: "quantity"
            }))
        );
    }

    #[test]
    fn test_everything_at_once() {
        let config = sample_config();
        let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear");
        request.is_polished = true;
        request.is_beveled = true;
        request.num_clipped_corners = 2;
        request.is_tempered = true;
        request.is_non_rectangular = true;
        request.is_contractor = true;
        request.quantity = 2;

        let b = QuoteEngine::new(&config).quote(&request).unwrap();
        let before = 25.5 + 120.0 * 0.18 + 120.0 * 0.55 + 2.0 * 2.5;
        assert!((b.before_markups_subtotal - before).abs() < 1e-9);

        let subtotal = before * 1.60;
        assert!((b.subtotal - subtotal).abs() < 1e-9);
        assert!((b.discounted_subtotal.unwrap() - subtotal * 0.85).abs() < 1e-9);
        assert!((b.total - subtotal * 0.85 * 2.0).abs() < 1e-9);
        assert_eq!(b.quote_price, b.total / 0.28);
    }

    #[test]
    fn test_multiplier_formula_applies_to_total() {
        let mut config = sample_config();
        config.formula.mode = FormulaMode::Multiplier;
        config.formula.multiplier_value = 2.0;

        let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear");
        request.quantity = 4;
        let b = QuoteEngine::new(&config).quote(&request).unwrap();
        assert_eq!(b.total, 102.0);
        assert_eq!(b.quote_price, 204.0);
    }

    #[test]
    fn test_calculate_quote_wire_result() {
        let config = sample_config();

        let ok = calculate_quote(&config, &QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"));
        assert!(!ok.is_error());
        assert_eq!(ok.total, 25.5);

        let mut bad = QuoteRequest::rectangle(24.0, 36.0, "1/8", "clear");
        bad.is_beveled = true;
        let rejected = calculate_quote(&config, &bad);
        assert_eq!(rejected.error.as_deref(), Some("1/8 glass cannot be beveled"));
        assert_eq!(rejected, QuoteResult::rejected(&RuleViolation::ThinGlassBeveled {
            thickness: "1/8".into()
        }.into()));
    }

    #[test]
    fn test_quote_all_preserves_order() {
        let config = sample_config();
        let engine = QuoteEngine::new(&config);

        let mut thin_tempered = QuoteRequest::rectangle(10.0, 10.0, "1/8", "clear");
        thin_tempered.is_tempered = true;
        let requests = vec![
            QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"),
            thin_tempered,
            QuoteRequest::circle(24.0, "3/8", "clear"),
        ];

        let results = engine.quote_all(&requests);
        assert_eq!(results.len(), 3);
        assert!(!results[0].is_error());
        assert!(results[1].is_error());
        assert!(results[2].shape_price.is_some());
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let config = sample_config();
        let engine = QuoteEngine::new(&config);

        let huge = QuoteRequest::rectangle(1e200, 1e200, "1/4", "clear");
        assert_eq!(
            engine.quote(&huge),
            Err(QuoteError::Invalid(ValidationError::NotFinite { field: "area" }))
        );

        let result = calculate_quote(&config, &huge);
        assert_eq!(result.error.as_deref(), Some("area must be a finite number"));
        assert_eq!(result.actual_sq_ft, 0.0);
        assert_eq!(result.quote_price, 0.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["quotePrice"], 0.0);
        assert_eq!(json["actualSqFt"], 0.0);
    }

    #[test]
    fn test_overflowing_retail_price_is_rejected() {
        let mut config = sample_config();
        config.formula.mode = FormulaMode::Multiplier;
        config.formula.multiplier_value = f64::MAX;

        let err = QuoteEngine::new(&config)
            .quote(&QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"))
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::Invalid(ValidationError::NotFinite { field: "quote_price" })
        );
    }

    #[test]
    fn test_custom_formula_fallback_is_flagged() {
        let mut config = sample_config();
        config.formula.mode = FormulaMode::Custom;
        config.formula.custom_expression = Some("__import__('os')".to_string());
        let engine = QuoteEngine::new(&config);
        assert_eq!(engine.config().version, config.version);

        let request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear");
        let b = engine.quote(&request).unwrap();
        assert!(b.formula_fallback);
        assert_eq!(b.quote_price, 25.5 / 0.28);
        assert!(engine.quote_result(&request).formula_fallback);

        config.formula.custom_expression = Some("total * 3".to_string());
        let b = QuoteEngine::new(&config).quote(&request).unwrap();
        assert!(!b.formula_fallback);
        assert_eq!(b.quote_price, 76.5);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuoteEngine<'static>>();
    }
}
