//! # Quote Types
//!
//! Request and result types exchanged with the host application.
//!
//! ## Type Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Quote Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐      ┌─────────────────┐      ┌────────────────┐  │
//! │  │  QuoteRequest   │ ───► │ QuoteBreakdown  │ ───► │  QuoteResult   │  │
//! │  │  ─────────────  │      │  ─────────────  │      │  ────────────  │  │
//! │  │  form fields    │      │  every stage    │      │  flat camel-   │  │
//! │  │  (host input)   │      │  (Rust side)    │      │  Case wire DTO │  │
//! │  └─────────────────┘      └─────────────────┘      └────────────────┘  │
//! │                                   │                        ▲            │
//! │                             QuoteError ────────────────────┘            │
//! │                                                 (error-only result)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::{ClipSize, GlassType, Thickness};
use crate::error::{QuoteError, ValidationError};
use crate::money::Money;

// =============================================================================
// Quote Request
// =============================================================================

/// One piece of glass to price, as collected from a quote form or import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteRequest {
    /// Inches. Required unless the piece is circular.
    #[serde(default)]
    pub width: Option<f64>,

    /// Inches. Required unless the piece is circular.
    #[serde(default)]
    pub height: Option<f64>,

    /// Inches. Required for circular pieces.
    #[serde(default)]
    pub diameter: Option<f64>,

    pub thickness: Thickness,
    pub glass_type: GlassType,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    #[serde(default)]
    pub is_polished: bool,
    #[serde(default)]
    pub is_beveled: bool,

    /// 0 to 4.
    #[serde(default)]
    pub num_clipped_corners: u8,
    #[serde(default)]
    pub clip_size: ClipSize,

    #[serde(default)]
    pub is_tempered: bool,
    #[serde(default)]
    pub is_non_rectangular: bool,
    #[serde(default)]
    pub is_circular: bool,
    #[serde(default)]
    pub is_contractor: bool,
}

fn default_quantity() -> u32 {
    1
}

impl QuoteRequest {
    /// A plain rectangular request with no treatments.
    pub fn rectangle(
        width: f64,
        height: f64,
        thickness: impl Into<Thickness>,
        glass_type: impl Into<GlassType>,
    ) -> Self {
        QuoteRequest {
            width: Some(width),
            height: Some(height),
            diameter: None,
            thickness: thickness.into(),
            glass_type: glass_type.into(),
            quantity: default_quantity(),
            is_polished: false,
            is_beveled: false,
            num_clipped_corners: 0,
            clip_size: ClipSize::default(),
            is_tempered: false,
            is_non_rectangular: false,
            is_circular: false,
            is_contractor: false,
        }
    }

    /// A plain circular request with no treatments.
    pub fn circle(
        diameter: f64,
        thickness: impl Into<Thickness>,
        glass_type: impl Into<GlassType>,
    ) -> Self {
        QuoteRequest {
            width: None,
            height: None,
            diameter: Some(diameter),
            is_circular: true,
            ..QuoteRequest::rectangle(0.0, 0.0, thickness, glass_type)
        }
    }

    /// Resolves the active shape mode and its dimensions.
    ///
    /// `is_circular` wins over `is_non_rectangular`; a circle is already
    /// non-rectangular.
    pub fn shape(&self) -> Result<Shape, ValidationError> {
        if self.is_circular {
            let diameter = self
                .diameter
                .ok_or(ValidationError::Required { field: "diameter" })?;
            return Ok(Shape::Circular { diameter });
        }

        let width = self.width.ok_or(ValidationError::Required { field: "width" })?;
        let height = self.height.ok_or(ValidationError::Required { field: "height" })?;

        if self.is_non_rectangular {
            Ok(Shape::NonRectangular { width, height })
        } else {
            Ok(Shape::Rectangular { width, height })
        }
    }
}

// =============================================================================
// Shape
// =============================================================================

/// The active shape mode of a request. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangular { width: f64, height: f64 },
    /// Priced on its bounding rectangle, with the shape markup.
    NonRectangular { width: f64, height: f64 },
    Circular { diameter: f64 },
}

impl Shape {
    pub fn is_circular(&self) -> bool {
        matches!(self, Shape::Circular { .. })
    }

    /// Whether the shape markup applies.
    pub fn is_shaped(&self) -> bool {
        !matches!(self, Shape::Rectangular { .. })
    }
}

// =============================================================================
// Lookup Miss
// =============================================================================

/// A price table lookup that found no row and priced at zero.
///
/// Lets callers tell "legitimately free" from "not in the tables".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "table", rename_all = "snake_case")]
#[ts(export)]
pub enum LookupMiss {
    GlassCost {
        thickness: Thickness,
        glass_type: GlassType,
    },
    BeveledCost {
        thickness: Thickness,
    },
    ClippedCornerCost {
        thickness: Thickness,
        clip_size: ClipSize,
    },
}

// =============================================================================
// Quote Breakdown
// =============================================================================

/// Fully itemized price of one accepted request.
///
/// Optional fields are `None` when the feature was not requested or its
/// stage is switched off; either way it contributed zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBreakdown {
    pub actual_sq_ft: f64,
    pub billable_sq_ft: f64,
    pub perimeter_inches: f64,
    pub minimum_charge_applied: bool,

    pub base_price: f64,
    pub polish_price: Option<f64>,
    pub beveled_price: Option<f64>,
    pub clipped_corners_price: Option<f64>,
    pub before_markups_subtotal: f64,

    pub tempered_price: Option<f64>,
    pub shape_price: Option<f64>,
    pub subtotal: f64,

    pub contractor_discount: Option<f64>,
    pub discounted_subtotal: Option<f64>,

    pub quantity: u32,
    /// Per-piece price (after any discount) times quantity.
    pub total: f64,
    /// Retail price after the configured formula.
    pub quote_price: f64,
    /// The custom formula failed and the divisor formula priced this quote.
    pub formula_fallback: bool,

    pub lookup_misses: Vec<LookupMiss>,
}

impl QuoteBreakdown {
    /// The retail price rounded to cents.
    pub fn quote_price_money(&self) -> Money {
        Money::from_dollars_rounded(self.quote_price)
    }
}

// =============================================================================
// Quote Result
// =============================================================================

/// Wire record handed back to the host for display and persistence.
///
/// Either every numeric field is populated and `error` is `None`, or every
/// numeric field is zero/absent and `error` carries the rejection message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteResult {
    pub actual_sq_ft: f64,
    pub billable_sq_ft: f64,
    pub perimeter_inches: f64,
    pub base_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beveled_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clipped_corners_price: Option<f64>,
    pub before_markups_subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempered_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_price: Option<f64>,
    pub subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contractor_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_subtotal: Option<f64>,
    pub total: f64,
    pub quote_price: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub formula_fallback: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_misses: Vec<LookupMiss>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuoteResult {
    /// An error-only result.
    pub fn rejected(error: &QuoteError) -> Self {
        QuoteResult {
            error: Some(error.to_string()),
            ..QuoteResult::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when the billed area was raised to the minimum charge.
    pub fn minimum_charge_applied(&self) -> bool {
        self.error.is_none() && self.billable_sq_ft > self.actual_sq_ft
    }
}

impl From<QuoteBreakdown> for QuoteResult {
    fn from(b: QuoteBreakdown) -> Self {
        QuoteResult {
            actual_sq_ft: b.actual_sq_ft,
            billable_sq_ft: b.billable_sq_ft,
            perimeter_inches: b.perimeter_inches,
            base_price: b.base_price,
            polish_price: b.polish_price,
            beveled_price: b.beveled_price,
            clipped_corners_price: b.clipped_corners_price,
            before_markups_subtotal: b.before_markups_subtotal,
            tempered_price: b.tempered_price,
            shape_price: b.shape_price,
            subtotal: b.subtotal,
            contractor_discount: b.contractor_discount,
            discounted_subtotal: b.discounted_subtotal,
            total: b.total,
            quote_price: b.quote_price,
            formula_fallback: b.formula_fallback,
            lookup_misses: b.lookup_misses,
            error: None,
        }
    }
}

impl From<Result<QuoteBreakdown, QuoteError>> for QuoteResult {
    fn from(outcome: Result<QuoteBreakdown, QuoteError>) -> Self {
        match outcome {
            Ok(breakdown) => breakdown.into(),
            Err(err) => QuoteResult::rejected(&err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleViolation;

    #[test]
    fn test_request_defaults_from_json() {
        let req: QuoteRequest = serde_json::from_str(
            r#"{ "width": 24, "height": 36, "thickness": "1/4", "glass_type": "clear" }"#,
        )
        .unwrap();
        assert_eq!(req.quantity, 1);
        assert_eq!(req.clip_size, ClipSize::Under1);
        assert!(!req.is_contractor);
        assert_eq!(req, QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear"));
    }

    #[test]
    fn test_shape_resolution() {
        let rect = QuoteRequest::rectangle(10.0, 20.0, "1/4", "clear");
        assert_eq!(
            rect.shape(),
            Ok(Shape::Rectangular {
                width: 10.0,
                height: 20.0
            })
        );

        let mut odd = rect.clone();
        odd.is_non_rectangular = true;
        assert!(odd.shape().unwrap().is_shaped());
        assert!(!odd.shape().unwrap().is_circular());

        let mut both = QuoteRequest::circle(24.0, "1/4", "clear");
        both.is_non_rectangular = true;
        assert_eq!(both.shape(), Ok(Shape::Circular { diameter: 24.0 }));
    }

    #[test]
    fn test_shape_requires_dimensions() {
        let mut circle = QuoteRequest::circle(24.0, "1/4", "clear");
        circle.diameter = None;
        circle.width = Some(24.0);
        circle.height = Some(24.0);
        assert_eq!(
            circle.shape(),
            Err(ValidationError::Required { field: "diameter" })
        );

        let mut rect = QuoteRequest::rectangle(10.0, 20.0, "1/4", "clear");
        rect.height = None;
        assert_eq!(rect.shape(), Err(ValidationError::Required { field: "height" }));
    }

    #[test]
    fn test_rejected_result_has_no_numbers() {
        let outcome: Result<QuoteBreakdown, QuoteError> =
            Err(RuleViolation::MirrorTempered.into());
        let result = QuoteResult::from(outcome);
        assert_eq!(result.error.as_deref(), Some("Mirror cannot be tempered"));
        assert_eq!(result.total, 0.0);
        assert_eq!(result.quote_price, 0.0);
        assert!(result.polish_price.is_none());
        assert!(!result.minimum_charge_applied());
    }

    #[test]
    fn test_result_wire_format_is_camel_case() {
        let result = QuoteResult {
            billable_sq_ft: 6.0,
            quote_price: 91.07,
            ..QuoteResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["billableSqFt"], 6.0);
        assert_eq!(json["quotePrice"], 91.07);
        assert!(json.get("polishPrice").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("formulaFallback").is_none());

        let degraded = QuoteResult {
            formula_fallback: true,
            ..result
        };
        assert_eq!(serde_json::to_value(&degraded).unwrap()["formulaFallback"], true);
    }

    #[test]
    fn test_lookup_miss_is_tagged() {
        let miss = LookupMiss::BeveledCost {
            thickness: Thickness::from("5/8"),
        };
        let json = serde_json::to_value(&miss).unwrap();
        assert_eq!(json["table"], "beveled_cost");
        assert_eq!(json["thickness"], "5/8");
    }
}
