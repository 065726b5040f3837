//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glazier_core::{FormulaMode, PricingConfiguration, QuoteRequest};

/// The sample shop price list.
pub fn sample_config() -> PricingConfiguration {
    serde_json::from_str(include_str!("../fixtures/pricing.json")).expect("fixture must parse")
}

/// The sample price list with a custom retail formula.
pub fn custom_formula_config(expression: &str) -> PricingConfiguration {
    let mut config = sample_config();
    config.formula.mode = FormulaMode::Custom;
    config.formula.custom_expression = Some(expression.to_string());
    config
}

/// 24" x 36" quarter-inch clear, no treatments.
pub fn standard_request() -> QuoteRequest {
    QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
