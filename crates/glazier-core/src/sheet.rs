//! # Quote Sheet
//!
//! Aggregates priced line items into a multi-line quote total.
//!
//! ```text
//! line 1  QuoteResult ──► quote_price ──► cents ─┐
//! line 2  QuoteResult ──► quote_price ──► cents ─┼──► grand_total
//! line 3  QuoteResult ──► error ─────────────────┴──► rejected_lines
//! ```
//!
//! Each line is rounded to cents before summing, so the grand total always
//! equals the sum of the line prices a customer sees.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::PricingConfiguration;
use crate::engine::QuoteEngine;
use crate::money::Money;
use crate::types::{QuoteRequest, QuoteResult};

/// A multi-line quote and its total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteSheet {
    pub config_version: u64,
    pub lines: Vec<QuoteResult>,
    /// Sum of accepted line prices.
    pub grand_total: Money,
    pub rejected_lines: usize,
}

impl QuoteSheet {
    /// Builds a sheet from results that were already priced.
    pub fn from_results(config_version: u64, lines: Vec<QuoteResult>) -> Self {
        let (accepted, rejected): (Vec<&QuoteResult>, Vec<&QuoteResult>) =
            lines.iter().partition(|line| !line.is_error());

        let grand_total = accepted
            .iter()
            .map(|line| Money::from_dollars_rounded(line.quote_price))
            .sum();
        let rejected_lines = rejected.len();

        QuoteSheet {
            config_version,
            lines,
            grand_total,
            rejected_lines,
        }
    }

    /// Prices every request against one snapshot.
    pub fn price(config: &PricingConfiguration, requests: &[QuoteRequest]) -> Self {
        let lines = QuoteEngine::new(config).quote_all(requests);
        QuoteSheet::from_results(config.version, lines)
    }

    pub fn accepted_lines(&self) -> usize {
        self.lines.len() - self.rejected_lines
    }

    pub fn is_complete(&self) -> bool {
        self.rejected_lines == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
