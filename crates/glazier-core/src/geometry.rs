//! # Geometry
//!
//! Turns raw dimensions into billable area and perimeter.
//!
//! ```text
//!  Rectangular / non-rectangular      Circular
//!  ┌──────── w ────────┐                 ╭───╮
//!  │                   h               ╱  d  ╲
//!  └───────────────────┘               ╲     ╱
//!  area = w*h / 144                      ╰───╯
//!  perimeter = 2(w + h)               area = π(d/2)² / 144
//!                                     perimeter = πd
//!
//!  billable = max(area, minimum_billable_sq_ft)
//! ```
//!
//! Non-rectangular pieces are cut from, and priced on, their bounding
//! rectangle.

use std::f64::consts::PI;

use crate::types::Shape;

/// Square inches per square foot.
const SQ_IN_PER_SQ_FT: f64 = 144.0;

/// Area and edge length of one piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// True area, unrounded.
    pub actual_sq_ft: f64,
    /// Area actually charged: never below the configured minimum.
    pub billable_sq_ft: f64,
    pub perimeter_inches: f64,
}

impl Geometry {
    /// True when the minimum charge raised the billed area.
    pub fn minimum_charge_applied(&self) -> bool {
        self.billable_sq_ft > self.actual_sq_ft
    }
}

/// Computes area and perimeter for a shape.
///
/// ## Example
/// ```rust
/// use glazier_core::geometry::compute_geometry;
/// use glazier_core::types::Shape;
///
/// let g = compute_geometry(Shape::Rectangular { width: 12.0, height: 12.0 }, 3.0);
/// assert_eq!(g.actual_sq_ft, 1.0);
/// assert_eq!(g.billable_sq_ft, 3.0);
/// assert_eq!(g.perimeter_inches, 48.0);
/// ```
pub fn compute_geometry(shape: Shape, minimum_billable_sq_ft: f64) -> Geometry {
    let (actual_sq_ft, perimeter_inches) = match shape {
        Shape::Rectangular { width, height } | Shape::NonRectangular { width, height } => {
            (width * height / SQ_IN_PER_SQ_FT, 2.0 * (width + height))
        }
        Shape::Circular { diameter } => {
            let radius = diameter / 2.0;
            (PI * radius * radius / SQ_IN_PER_SQ_FT, PI * diameter)
        }
    };

    Geometry {
        actual_sq_ft,
        billable_sq_ft: actual_sq_ft.max(minimum_billable_sq_ft),
        perimeter_inches,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
