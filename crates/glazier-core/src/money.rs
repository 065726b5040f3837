//! # Money Module
//!
//! Integer-cent `Money` for displaying and adding up quote prices.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pricing math needs real numbers: π for circles, per-inch rates,       │
//! │  divisor formulas. The engine therefore works in f64 dollars.          │
//! │                                                                         │
//! │  Adding prices up is a different matter:                               │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │                                                                         │
//! │  So every price is rounded ONCE to whole cents when it leaves the      │
//! │  engine, and all sums (multi-line grand totals) are done in cents.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use glazier_core::money::Money;
//!
//! let line = Money::from_dollars_rounded(91.071428);
//! assert_eq!(line.cents(), 9107);
//!
//! let total = line + Money::from_cents(500);
//! assert_eq!(total.to_string(), "$96.07");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts can be carried as negative amounts
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Saturating arithmetic**: sums of huge line prices clamp at the i64
///   bounds instead of overflowing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a dollar amount to the nearest cent, half away from zero.
    ///
    /// Non-finite input becomes zero. Amounts past the i64 range saturate.
    ///
    /// ```rust
    /// use glazier_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars_rounded(10.005).cents(), 1001);
    /// assert_eq!(Money::from_dollars_rounded(-2.5).cents(), -250);
    /// assert_eq!(Money::from_dollars_rounded(f64::NAN).cents(), 0);
    /// ```
    pub fn from_dollars_rounded(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::zero();
        }
        // 1e-9 absorbs representation error such as 10.005 == 10.00499999...
        let scaled = dollars * 100.0;
        let nudged = scaled + scaled.signum() * 1e-9;
        Money(nudged.round() as i64)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Cents portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The value as f64 dollars, for display layers that want a number.
    #[inline]
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Debug-friendly display. Front ends should format for their locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
