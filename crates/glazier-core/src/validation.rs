//! # Validation Module
//!
//! Everything that can reject a quote, run before any price is looked up.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: validate_request                                             │
//! │  ├── quantity >= 1, clipped corners 0-4                                │
//! │  └── active shape has finite, positive dimensions                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: validate_rules (ordered, first failure wins)                 │
//! │  ├── 1. thinnest stock: no temper, no polish, no bevel                 │
//! │  ├── 2. thinnest stock: no mirror                                      │
//! │  ├── 3. mirror: never tempered                                         │
//! │  ├── 4. mirror: no clipped corners                                     │
//! │  └── 5. circular: no clipped corners                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pricing stages (never see a rejected request)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rule order is part of the contract: callers and tests rely on the
//! same request always producing the same message.

use crate::config::{GlassType, Thickness};
use crate::error::{RuleViolation, ValidationError};
use crate::types::{QuoteRequest, Shape};

/// Most corners a rectangular piece has to clip.
pub const MAX_CLIPPED_CORNERS: u8 = 4;

/// Result type for request validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Validation
// =============================================================================

/// Checks that a request is well-formed and resolves its shape.
///
/// ## Example
/// ```rust
/// use glazier_core::types::QuoteRequest;
/// use glazier_core::validation::validate_request;
///
/// let mut request = QuoteRequest::rectangle(24.0, 36.0, "1/4", "clear");
/// assert!(validate_request(&request).is_ok());
///
/// request.quantity = 0;
/// assert!(validate_request(&request).is_err());
/// ```
pub fn validate_request(request: &QuoteRequest) -> ValidationResult<Shape> {
    if request.quantity == 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if request.num_clipped_corners > MAX_CLIPPED_CORNERS {
        return Err(ValidationError::OutOfRange {
            field: "num_clipped_corners",
            min: 0,
            max: MAX_CLIPPED_CORNERS as i64,
        });
    }

    let shape = request.shape()?;
    match shape {
        Shape::Rectangular { width, height } | Shape::NonRectangular { width, height } => {
            validate_dimension("width", width)?;
            validate_dimension("height", height)?;
        }
        Shape::Circular { diameter } => validate_dimension("diameter", diameter)?,
    }

    Ok(shape)
}

fn validate_dimension(field: &'static str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(())
}

/// Rejects a computed quantity that overflowed or became NaN.
///
/// Finite dimensions can still multiply out to infinity, so the engine runs
/// this on every derived figure it hands back.
pub fn ensure_finite(field: &'static str, value: f64) -> ValidationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

// =============================================================================
// Business Rules
// =============================================================================

/// Checks the request against the shop's production rules.
///
/// ## Rules (in order)
/// 1. Thinnest stock cannot be tempered, polished or beveled
/// 2. Thinnest stock is not sold as mirror
/// 3. Mirror is never tempered
/// 4. Mirror cannot have clipped corners
/// 5. Circular pieces cannot have clipped corners
pub fn validate_rules(
    thickness: &Thickness,
    glass_type: &GlassType,
    is_polished: bool,
    is_beveled: bool,
    is_tempered: bool,
    num_clipped_corners: u8,
    is_circular: bool,
) -> Result<(), RuleViolation> {
    if thickness.is_thinnest() {
        if is_tempered {
            return Err(RuleViolation::ThinGlassTempered {
                thickness: thickness.clone(),
            });
        }
        if is_polished {
            return Err(RuleViolation::ThinGlassPolished {
                thickness: thickness.clone(),
            });
        }
        if is_beveled {
            return Err(RuleViolation::ThinGlassBeveled {
                thickness: thickness.clone(),
            });
        }
        if glass_type.is_mirror() {
            return Err(RuleViolation::ThinMirror {
                thickness: thickness.clone(),
            });
        }
    }

    if glass_type.is_mirror() && is_tempered {
        return Err(RuleViolation::MirrorTempered);
    }

    if num_clipped_corners > 0 {
        if glass_type.is_mirror() {
            return Err(RuleViolation::MirrorClippedCorners);
        }
        if is_circular {
            return Err(RuleViolation::CircularClippedCorners);
        }
    }

    Ok(())
}

/// Runs [`validate_rules`] with the fields of a request.
pub fn validate_request_rules(request: &QuoteRequest, shape: Shape) -> Result<(), RuleViolation> {
    validate_rules(
        &request.thickness,
        &request.glass_type,
        request.is_polished,
        request.is_beveled,
        request.is_tempered,
        request.num_clipped_corners,
        shape.is_circular(),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
