//! # Component Pricing
//!
//! Wholesale cost of each priceable feature of a piece.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Component        Formula                               Toggle          │
//! │  ───────────────  ────────────────────────────────────  ─────────────── │
//! │  Base             billable_sq_ft × base_cost_per_sq_ft  base_price      │
//! │  Polish           perimeter × polish rate *             polish          │
//! │  Beveled          perimeter × beveled_costs[thickness]  beveled         │
//! │                   (always 0 for the thinnest stock)                     │
//! │  Clipped corners  corners × clipped_corner_costs[t, s]  clipped_corners │
//! │                                                                         │
//! │  * mirror uses settings.flat_polish_rate, everything else the glass     │
//! │    table's polish_cost_per_inch                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing table row prices at zero and is reported as a [`LookupMiss`]
//! instead of failing the quote. A disabled toggle skips the lookup entirely.

use tracing::debug;

use crate::config::{GlassCost, PricingConfiguration};
use crate::geometry::Geometry;
use crate::types::{LookupMiss, QuoteRequest};

/// Wholesale cost of each component of one piece.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentPrices {
    pub base_price: f64,
    pub polish_price: Option<f64>,
    pub beveled_price: Option<f64>,
    pub clipped_corners_price: Option<f64>,
    pub lookup_misses: Vec<LookupMiss>,
}

impl ComponentPrices {
    /// Sum of all components: the figure markups are computed on.
    pub fn before_markups(&self) -> f64 {
        self.base_price
            + self.polish_price.unwrap_or(0.0)
            + self.beveled_price.unwrap_or(0.0)
            + self.clipped_corners_price.unwrap_or(0.0)
    }
}

/// Prices every requested, enabled component.
pub fn resolve_components(
    config: &PricingConfiguration,
    request: &QuoteRequest,
    geometry: &Geometry,
) -> ComponentPrices {
    let toggles = &config.formula.toggles;
    let mut prices = ComponentPrices::default();

    // Base and polish share the glass row; look it up once so a gap is reported once.
    let needs_glass_row =
        toggles.base_price || (request.is_polished && toggles.polish && !request.glass_type.is_mirror());
    let glass_row = if needs_glass_row {
        lookup_glass_cost(config, request, &mut prices.lookup_misses)
    } else {
        None
    };

    if toggles.base_price {
        let rate = glass_row.map_or(0.0, |row| row.base_cost_per_sq_ft);
        prices.base_price = geometry.billable_sq_ft * rate;
    }

    if request.is_polished && toggles.polish {
        let rate = if request.glass_type.is_mirror() {
            config.settings.flat_polish_rate
        } else {
            glass_row.map_or(0.0, |row| row.polish_cost_per_inch)
        };
        prices.polish_price = Some(geometry.perimeter_inches * rate);
    }

    if request.is_beveled && toggles.beveled {
        let price = if request.thickness.is_thinnest() {
            0.0
        } else {
            let rate = config.beveled_cost(&request.thickness).unwrap_or_else(|| {
                debug!(thickness = %request.thickness, "No beveled cost row, pricing at zero");
                prices.lookup_misses.push(LookupMiss::BeveledCost {
                    thickness: request.thickness.clone(),
                });
                0.0
            });
            geometry.perimeter_inches * rate
        };
        prices.beveled_price = Some(price);
    }

    if request.num_clipped_corners > 0 && toggles.clipped_corners {
        let cost = config
            .clipped_corner_cost(&request.thickness, request.clip_size)
            .unwrap_or_else(|| {
                debug!(
                    thickness = %request.thickness,
                    clip_size = %request.clip_size,
                    "No clipped corner cost row, pricing at zero"
                );
                prices.lookup_misses.push(LookupMiss::ClippedCornerCost {
                    thickness: request.thickness.clone(),
                    clip_size: request.clip_size,
                });
                0.0
            });
        prices.clipped_corners_price = Some(f64::from(request.num_clipped_corners) * cost);
    }

    prices
}

fn lookup_glass_cost<'a>(
    config: &'a PricingConfiguration,
    request: &QuoteRequest,
    misses: &mut Vec<LookupMiss>,
) -> Option<&'a GlassCost> {
    let row = config.glass_cost(&request.thickness, &request.glass_type);
    if row.is_none() {
        debug!(
            thickness = %request.thickness,
            glass_type = %request.glass_type,
            "No glass cost row, pricing at zero"
        );
        misses.push(LookupMiss::GlassCost {
            thickness: request.thickness.clone(),
            glass_type: request.glass_type.clone(),
        });
    }
    row
}

// =============================================================================
// Unit Tests
// =============================================================================
