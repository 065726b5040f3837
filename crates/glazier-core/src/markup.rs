//! # Markups and Discounts
//!
//! Applies tempered/shape markups and the contractor discount on top of the
//! wholesale component subtotal.
//!
//! ## Subtotal Chain
//! ```text
//! before_markups = base + polish + beveled + clipped_corners
//!       │
//!       ├── + tempered markup   (tempered, not mirror, toggle on)
//!       ├── + shape markup      (non-rectangular or circular, toggle on)
//!       ▼
//! subtotal
//!       │
//!       ├── - contractor discount (contractor, toggle on)
//!       ▼
//! per-piece price × quantity = total
//! ```
//!
//! Both markups are computed on `before_markups`, never on each other.

use crate::config::PricingConfiguration;
use crate::types::{QuoteRequest, Shape};

/// Result of the markup and discount stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkupSummary {
    pub tempered_price: Option<f64>,
    pub shape_price: Option<f64>,
    pub subtotal: f64,
    pub contractor_discount: Option<f64>,
    pub discounted_subtotal: Option<f64>,
    pub total: f64,
}

/// Applies markups, discount and quantity to a wholesale subtotal.
pub fn apply_markups(
    config: &PricingConfiguration,
    request: &QuoteRequest,
    shape: Shape,
    before_markups: f64,
) -> MarkupSummary {
    let toggles = &config.formula.toggles;

    // Mirrors are never tempered, even if the flag slipped through.
    let tempered_price = (request.is_tempered
        && !request.glass_type.is_mirror()
        && toggles.tempered_markup)
        .then(|| before_markups * percent(config.markup_rates.tempered));

    let shape_price = (shape.is_shaped() && toggles.shape_markup)
        .then(|| before_markups * percent(config.markup_rates.shape));

    let subtotal =
        before_markups + tempered_price.unwrap_or(0.0) + shape_price.unwrap_or(0.0);

    let contractor_discount = (request.is_contractor && toggles.contractor_discount)
        .then(|| subtotal * config.settings.contractor_discount_rate);
    let discounted_subtotal = contractor_discount.map(|discount| subtotal - discount);

    let per_piece = discounted_subtotal.unwrap_or(subtotal);

    MarkupSummary {
        tempered_price,
        shape_price,
        subtotal,
        contractor_discount,
        discounted_subtotal,
        total: per_piece * f64::from(request.quantity),
    }
}

/// Markup rates are stored as whole percentages.
#[inline]
fn percent(rate: f64) -> f64 {
    rate / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
