//! # Retail Formula
//!
//! Converts the wholesale-inclusive total into the customer quote price.
//!
//! ## Modes and Fallbacks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Formula Dispatch                                │
//! │                                                                         │
//! │  divisor     total / divisor_value                                      │
//! │              divisor_value <= 0 or not finite ──► DEFAULT_DIVISOR       │
//! │                                                                         │
//! │  multiplier  total * multiplier_value                                   │
//! │                                                                         │
//! │  custom      parse ──► evaluate(total) ──► finite and >= 0 ?            │
//! │                │            │                    │                      │
//! │                └── error ───┴──── no ────────────┴──► warn! + divisor   │
//! │                                                                         │
//! │  A bad custom formula never rejects a quote. It prices with the        │
//! │  divisor formula and logs why.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sandbox
//! Custom expressions are administrator input and treated as untrusted.
//! They are parsed into a closed arithmetic AST (see [`parser`]): one
//! variable (`total`), two constants, a fixed function table. There is no
//! host access to deny because the language cannot name any.

pub mod eval;
mod lexer;
pub mod parser;

use tracing::warn;

use crate::config::{FormulaConfig, FormulaMode, DEFAULT_DIVISOR};
use crate::error::FormulaError;
use parser::Expr;

/// Longest custom expression accepted, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 512;

// =============================================================================
// Compiled Custom Formula
// =============================================================================

/// A custom expression that passed parsing.
///
/// ## Example
/// ```rust
/// use glazier_core::formula::Formula;
///
/// let formula = Formula::compile("total * 2 + 50").unwrap();
/// assert_eq!(formula.evaluate(100.0).unwrap(), 250.0);
///
/// assert!(Formula::compile("__import__('os').system('ls')").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parses and checks an expression without evaluating it.
    pub fn compile(source: &str) -> Result<Formula, FormulaError> {
        if source.trim().is_empty() {
            return Err(FormulaError::Empty);
        }
        if source.len() > MAX_EXPRESSION_LEN {
            return Err(FormulaError::TooLong {
                len: source.len(),
                max: MAX_EXPRESSION_LEN,
            });
        }

        Ok(Formula {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates with `total` bound; the result must be a usable price.
    pub fn evaluate(&self, total: f64) -> Result<f64, FormulaError> {
        let value = eval::evaluate(&self.expr, total);
        if value.is_finite() && value >= 0.0 {
            // Normalize -0.0 so identical inputs serialize identically.
            Ok(value + 0.0)
        } else {
            Err(FormulaError::InvalidResult { value })
        }
    }
}

// =============================================================================
// Retail Formula
// =============================================================================

/// Result of applying the retail formula.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaOutcome {
    pub quote_price: f64,
    /// Set when custom mode failed and the divisor formula was used instead.
    pub fallback: Option<FormulaError>,
}

/// The retail conversion for one configuration snapshot.
///
/// Compiles the custom expression once so batches of quotes do not re-parse.
#[derive(Debug, Clone)]
pub struct RetailFormula {
    mode: FormulaMode,
    divisor_value: f64,
    multiplier_value: f64,
    custom: Option<Result<Formula, FormulaError>>,
}

impl RetailFormula {
    pub fn from_config(config: &FormulaConfig) -> Self {
        let custom = (config.mode == FormulaMode::Custom).then(|| {
            config
                .custom_expression
                .as_deref()
                .ok_or(FormulaError::MissingExpression)
                .and_then(Formula::compile)
        });

        RetailFormula {
            mode: config.mode,
            divisor_value: config.divisor_value,
            multiplier_value: config.multiplier_value,
            custom,
        }
    }

    pub fn mode(&self) -> FormulaMode {
        self.mode
    }

    /// Converts a wholesale total into the quote price.
    pub fn apply(&self, total: f64) -> FormulaOutcome {
        match self.mode {
            FormulaMode::Divisor => FormulaOutcome {
                quote_price: self.divide(total),
                fallback: None,
            },
            FormulaMode::Multiplier => FormulaOutcome {
                quote_price: total * self.multiplier_value,
                fallback: None,
            },
            FormulaMode::Custom => {
                let result = match &self.custom {
                    Some(Ok(formula)) => formula.evaluate(total),
                    Some(Err(err)) => Err(err.clone()),
                    None => Err(FormulaError::MissingExpression),
                };
                match result {
                    Ok(quote_price) => FormulaOutcome {
                        quote_price,
                        fallback: None,
                    },
                    Err(err) => {
                        warn!(
                            error = %err,
                            expression = self.expression().unwrap_or(""),
                            "Custom formula failed, using divisor formula"
                        );
                        FormulaOutcome {
                            quote_price: self.divide(total),
                            fallback: Some(err),
                        }
                    }
                }
            }
        }
    }

    fn divide(&self, total: f64) -> f64 {
        total / effective_divisor(self.divisor_value)
    }

    fn expression(&self) -> Option<&str> {
        match &self.custom {
            Some(Ok(formula)) => Some(formula.source()),
            _ => None,
        }
    }
}

/// The configured divisor, or [`DEFAULT_DIVISOR`] when it cannot be divided by.
pub fn effective_divisor(divisor_value: f64) -> f64 {
    if divisor_value.is_finite() && divisor_value > 0.0 {
        divisor_value
    } else {
        warn!(divisor_value, default = DEFAULT_DIVISOR, "Unusable divisor, using default");
        DEFAULT_DIVISOR
    }
}

/// One-shot form of [`RetailFormula::apply`].
pub fn apply_formula(config: &FormulaConfig, total: f64) -> FormulaOutcome {
    RetailFormula::from_config(config).apply(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(expression: &str) -> FormulaConfig {
        FormulaConfig {
            mode: FormulaMode::Custom,
            custom_expression: Some(expression.to_string()),
            ..FormulaConfig::default()
        }
    }

    #[test]
    fn test_divisor_mode() {
        let config = FormulaConfig::default();
        let outcome = apply_formula(&config, 28.0);
        assert_eq!(outcome.quote_price, 28.0 / 0.28);
        assert!(outcome.fallback.is_none());
    }

    #[test]
    fn test_zero_divisor_uses_default() {
        let config = FormulaConfig {
            divisor_value: 0.0,
            ..FormulaConfig::default()
        };
        assert_eq!(apply_formula(&config, 56.0).quote_price, 56.0 / DEFAULT_DIVISOR);

        let config = FormulaConfig {
            divisor_value: -2.0,
            ..FormulaConfig::default()
        };
        assert_eq!(apply_formula(&config, 56.0).quote_price, 56.0 / DEFAULT_DIVISOR);
    }

    #[test]
    fn test_multiplier_mode() {
        let config = FormulaConfig {
            mode: FormulaMode::Multiplier,
            multiplier_value: 3.0,
            ..FormulaConfig::default()
        };
        assert_eq!(apply_formula(&config, 20.0).quote_price, 60.0);
    }

    #[test]
    fn test_custom_mode() {
        let outcome = apply_formula(&custom("total * 2 + 50"), 40.0);
        assert_eq!(outcome.quote_price, 130.0);
        assert!(outcome.fallback.is_none());
    }

    #[test]
    fn test_custom_failures_fall_back_to_divisor() {
        let divisor = 28.0 / 0.28;
        for expression in [
            "import os",
            "__import__('os').system('rm -rf /')",
            "eval('1')",
            "lambda: 0",
            "x => x",
            "new Date()",
            "total - 1000",
            "total / 0",
            "sqrt(-total)",
            "",
        ] {
            let outcome = apply_formula(&custom(expression), 28.0);
            assert_eq!(outcome.quote_price, divisor, "{}", expression);
            assert!(outcome.fallback.is_some(), "{}", expression);
        }
    }

    #[test]
    fn test_missing_and_oversized_expressions() {
        let config = FormulaConfig {
            mode: FormulaMode::Custom,
            custom_expression: None,
            ..FormulaConfig::default()
        };
        assert_eq!(
            apply_formula(&config, 28.0).fallback,
            Some(FormulaError::MissingExpression)
        );

        let long = format!("total{}", " + 1".repeat(200));
        assert!(matches!(
            Formula::compile(&long),
            Err(FormulaError::TooLong { .. })
        ));
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let formula = Formula::compile("-total").unwrap();
        let value = formula.evaluate(0.0).unwrap();
        assert!(value.is_sign_positive());
    }

    #[test]
    fn test_retail_formula_is_reusable() {
        let retail = RetailFormula::from_config(&custom("round(total / 0.3, 2)"));
        assert_eq!(retail.mode(), FormulaMode::Custom);
        assert_eq!(retail.apply(30.0).quote_price, 100.0);
        assert_eq!(retail.apply(3.0).quote_price, 10.0);
    }
}
