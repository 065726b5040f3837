//! # Pricing Configuration
//!
//! The administrator-maintained pricing snapshot the engine prices against.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pricing Configuration Flow                           │
//! │                                                                         │
//! │  Admin edits tables ──► Host persists version N ──► Host loads snapshot │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                    calculate_quote(&snapshot, &request) │
//! │                                                                         │
//! │  The engine only ever borrows the snapshot. It never mutates it and    │
//! │  never caches it between calls. A new version supersedes the old one   │
//! │  for future quotes only.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File (TOML, loaded by the host)
//! ```toml
//! version = 7
//!
//! [[glass_costs]]
//! thickness = "1/4"
//! glass_type = "clear"
//! base_cost_per_sq_ft = 4.25
//! polish_cost_per_inch = 0.18
//!
//! [markup_rates]
//! tempered = 35
//! shape = 25
//!
//! [beveled_costs]
//! "1/4" = 0.55
//!
//! [[clipped_corner_costs]]
//! thickness = "1/4"
//! clip_size = "under_1"
//! cost_per_corner = 2.5
//!
//! [formula]
//! mode = "divisor"
//! divisor_value = 0.28
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ConfigError, ConfigResult};
use crate::formula::Formula;

/// The thickness class that cannot take any edge work.
pub const THINNEST_THICKNESS: &str = "1/8";

/// The glass type with its own polish rate and treatment restrictions.
pub const MIRROR_GLASS_TYPE: &str = "mirror";

/// Divisor used whenever the configured one is unusable.
pub const DEFAULT_DIVISOR: f64 = 0.28;

// =============================================================================
// Table Keys
// =============================================================================

/// Glass thickness class, e.g. `"1/4"`.
///
/// Open enumeration: administrators add new classes by adding table rows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Thickness(String);

impl Thickness {
    pub fn new(value: impl Into<String>) -> Self {
        Thickness(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the stock class that forbids tempering, polish and bevel.
    pub fn is_thinnest(&self) -> bool {
        self.0 == THINNEST_THICKNESS
    }
}

impl From<&str> for Thickness {
    fn from(value: &str) -> Self {
        Thickness::new(value)
    }
}

impl fmt::Display for Thickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glass type, e.g. `"clear"`, `"bronze"`, `"mirror"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct GlassType(String);

impl GlassType {
    pub fn new(value: impl Into<String>) -> Self {
        GlassType(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mirror(&self) -> bool {
        self.0 == MIRROR_GLASS_TYPE
    }
}

impl From<&str> for GlassType {
    fn from(value: &str) -> Self {
        GlassType::new(value)
    }
}

impl fmt::Display for GlassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size bucket of a clipped corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClipSize {
    /// Clip leg under one inch.
    #[default]
    #[serde(rename = "under_1")]
    Under1,
    /// Clip leg of one inch or more.
    #[serde(rename = "over_1")]
    Over1,
}

impl fmt::Display for ClipSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipSize::Under1 => write!(f, "under_1"),
            ClipSize::Over1 => write!(f, "over_1"),
        }
    }
}

// =============================================================================
// Cost Tables
// =============================================================================

/// Wholesale cost row for one (thickness, glass type) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GlassCost {
    pub thickness: Thickness,
    pub glass_type: GlassType,

    /// Supplier cost per billable square foot.
    pub base_cost_per_sq_ft: f64,

    /// Supplier cost per perimeter inch of polished edge.
    #[serde(default)]
    pub polish_cost_per_inch: f64,

    /// Supplier only stocks this combination tempered.
    #[serde(default)]
    pub only_tempered: bool,

    /// Edge polish is not offered for this combination.
    #[serde(default)]
    pub no_polish: bool,

    /// Tempering is not offered for this combination.
    #[serde(default)]
    pub never_tempered: bool,
}

/// Flat per-corner cost for a clipped corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClippedCornerCost {
    pub thickness: Thickness,
    pub clip_size: ClipSize,
    pub cost_per_corner: f64,
}

/// Markup percentages (0-100) applied on top of the wholesale subtotal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarkupRates {
    #[serde(default)]
    pub tempered: f64,

    /// Applied to non-rectangular and circular pieces.
    #[serde(default)]
    pub shape: f64,
}

// =============================================================================
// System Settings
// =============================================================================

/// Shop-wide pricing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SystemSettings {
    /// Smallest area ever billed, in square feet.
    #[serde(default = "default_minimum_billable_sq_ft")]
    pub minimum_billable_sq_ft: f64,

    /// Fraction taken off the subtotal for contractors (0.15 = 15%).
    #[serde(default = "default_contractor_discount_rate")]
    pub contractor_discount_rate: f64,

    /// Per-inch polish rate used for mirror regardless of the glass table.
    #[serde(default = "default_flat_polish_rate")]
    pub flat_polish_rate: f64,
}

fn default_minimum_billable_sq_ft() -> f64 {
    3.0
}

fn default_contractor_discount_rate() -> f64 {
    0.15
}

fn default_flat_polish_rate() -> f64 {
    0.27
}

impl Default for SystemSettings {
    fn default() -> Self {
        SystemSettings {
            minimum_billable_sq_ft: default_minimum_billable_sq_ft(),
            contractor_discount_rate: default_contractor_discount_rate(),
            flat_polish_rate: default_flat_polish_rate(),
        }
    }
}

// =============================================================================
// Formula Configuration
// =============================================================================

/// How the wholesale total converts to the retail quote price.
///
/// ## Modes
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  DIVISOR (Default)     quote = total / divisor_value                    │
/// │  MULTIPLIER            quote = total * multiplier_value                 │
/// │  CUSTOM                quote = custom_expression(total)                 │
/// │                        falls back to DIVISOR on any failure             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FormulaMode {
    #[default]
    Divisor,
    Multiplier,
    Custom,
}

impl fmt::Display for FormulaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaMode::Divisor => write!(f, "divisor"),
            FormulaMode::Multiplier => write!(f, "multiplier"),
            FormulaMode::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for FormulaMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "divisor" => Ok(FormulaMode::Divisor),
            "multiplier" => Ok(FormulaMode::Multiplier),
            "custom" => Ok(FormulaMode::Custom),
            other => Err(ConfigError::UnknownFormulaMode(other.to_string())),
        }
    }
}

/// Per-stage switches. Every stage is enabled unless turned off.
///
/// A disabled stage contributes exactly zero to the subtotal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeatureToggles {
    #[serde(default = "default_true")]
    pub base_price: bool,
    #[serde(default = "default_true")]
    pub polish: bool,
    #[serde(default = "default_true")]
    pub beveled: bool,
    #[serde(default = "default_true")]
    pub clipped_corners: bool,
    #[serde(default = "default_true")]
    pub tempered_markup: bool,
    #[serde(default = "default_true")]
    pub shape_markup: bool,
    #[serde(default = "default_true")]
    pub contractor_discount: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureToggles {
    fn default() -> Self {
        FeatureToggles {
            base_price: true,
            polish: true,
            beveled: true,
            clipped_corners: true,
            tempered_markup: true,
            shape_markup: true,
            contractor_discount: true,
        }
    }
}

/// Retail conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormulaConfig {
    #[serde(default)]
    pub mode: FormulaMode,

    #[serde(default = "default_divisor_value")]
    pub divisor_value: f64,

    #[serde(default = "default_multiplier_value")]
    pub multiplier_value: f64,

    /// Arithmetic over `total`, e.g. `"total * 2 + 50"`.
    #[serde(default)]
    pub custom_expression: Option<String>,

    #[serde(default)]
    pub toggles: FeatureToggles,
}

fn default_divisor_value() -> f64 {
    DEFAULT_DIVISOR
}

fn default_multiplier_value() -> f64 {
    3.5
}

impl Default for FormulaConfig {
    fn default() -> Self {
        FormulaConfig {
            mode: FormulaMode::default(),
            divisor_value: default_divisor_value(),
            multiplier_value: default_multiplier_value(),
            custom_expression: None,
            toggles: FeatureToggles::default(),
        }
    }
}

// =============================================================================
// Treatment Options
// =============================================================================

/// Which treatments a quote form should offer for a material.
///
/// Advisory only: the validator still has the final word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TreatmentOptions {
    pub can_temper: bool,
    /// The material only comes tempered; the form should pre-check it.
    pub must_temper: bool,
    pub can_polish: bool,
    pub can_bevel: bool,
    pub can_clip_corners: bool,
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Complete pricing snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfiguration {
    /// Snapshot version assigned by the host. Informational.
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub glass_costs: Vec<GlassCost>,

    #[serde(default)]
    pub markup_rates: MarkupRates,

    /// Thickness -> cost per beveled perimeter inch.
    #[serde(default)]
    pub beveled_costs: BTreeMap<Thickness, f64>,

    #[serde(default)]
    pub clipped_corner_costs: Vec<ClippedCornerCost>,

    #[serde(default)]
    pub settings: SystemSettings,

    #[serde(default)]
    pub formula: FormulaConfig,
}

impl PricingConfiguration {
    /// Looks up the glass cost row for a material.
    pub fn glass_cost(&self, thickness: &Thickness, glass_type: &GlassType) -> Option<&GlassCost> {
        self.glass_costs
            .iter()
            .find(|row| &row.thickness == thickness && &row.glass_type == glass_type)
    }

    /// Looks up the beveled edge cost per inch for a thickness.
    pub fn beveled_cost(&self, thickness: &Thickness) -> Option<f64> {
        self.beveled_costs.get(thickness).copied()
    }

    /// Looks up the flat cost of one clipped corner.
    pub fn clipped_corner_cost(&self, thickness: &Thickness, clip_size: ClipSize) -> Option<f64> {
        self.clipped_corner_costs
            .iter()
            .find(|row| &row.thickness == thickness && row.clip_size == clip_size)
            .map(|row| row.cost_per_corner)
    }

    /// Returns the treatments a form should offer for a material.
    ///
    /// Combines the table flags with the hard business rules. An unknown
    /// material gets only the hard rules.
    pub fn treatment_options(&self, thickness: &Thickness, glass_type: &GlassType) -> TreatmentOptions {
        let row = self.glass_cost(thickness, glass_type);
        let thin = thickness.is_thinnest();
        let mirror = glass_type.is_mirror();

        let can_temper = !thin && !mirror && !row.map_or(false, |r| r.never_tempered);

        TreatmentOptions {
            can_temper,
            must_temper: can_temper && row.map_or(false, |r| r.only_tempered),
            can_polish: !thin && !row.map_or(false, |r| r.no_polish),
            can_bevel: !thin,
            can_clip_corners: !mirror,
        }
    }

    /// Validates the snapshot.
    ///
    /// ## Checks
    /// - Table keys are unique
    /// - Costs, rates and the minimum area are not negative
    /// - Markups are percentages (0-100), the discount is a fraction (0-1)
    /// - In custom mode, the expression compiles
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for row in &self.glass_costs {
            if !seen.insert((&row.thickness, &row.glass_type)) {
                return Err(ConfigError::DuplicateGlassCost {
                    thickness: row.thickness.clone(),
                    glass_type: row.glass_type.clone(),
                });
            }
            non_negative(
                || format!("glass_costs[{} {}].base_cost_per_sq_ft", row.thickness, row.glass_type),
                row.base_cost_per_sq_ft,
            )?;
            non_negative(
                || format!("glass_costs[{} {}].polish_cost_per_inch", row.thickness, row.glass_type),
                row.polish_cost_per_inch,
            )?;
        }

        for (thickness, cost) in &self.beveled_costs {
            non_negative(|| format!("beveled_costs[{}]", thickness), *cost)?;
        }

        let mut seen = HashSet::new();
        for row in &self.clipped_corner_costs {
            if !seen.insert((&row.thickness, row.clip_size)) {
                return Err(ConfigError::DuplicateClippedCornerCost {
                    thickness: row.thickness.clone(),
                    clip_size: row.clip_size,
                });
            }
            non_negative(
                || format!("clipped_corner_costs[{} {}]", row.thickness, row.clip_size),
                row.cost_per_corner,
            )?;
        }

        in_range("markup_rates.tempered", self.markup_rates.tempered, 0.0, 100.0)?;
        in_range("markup_rates.shape", self.markup_rates.shape, 0.0, 100.0)?;
        in_range(
            "settings.contractor_discount_rate",
            self.settings.contractor_discount_rate,
            0.0,
            1.0,
        )?;
        non_negative(
            || "settings.minimum_billable_sq_ft".to_string(),
            self.settings.minimum_billable_sq_ft,
        )?;
        non_negative(
            || "settings.flat_polish_rate".to_string(),
            self.settings.flat_polish_rate,
        )?;
        non_negative(|| "formula.divisor_value".to_string(), self.formula.divisor_value)?;
        non_negative(
            || "formula.multiplier_value".to_string(),
            self.formula.multiplier_value,
        )?;

        if self.formula.mode == FormulaMode::Custom {
            let expression = self
                .formula
                .custom_expression
                .as_deref()
                .ok_or(crate::error::FormulaError::MissingExpression)?;
            Formula::compile(expression)?;
        }

        Ok(())
    }
}

fn non_negative(field: impl FnOnce() -> String, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field: field(),
            value,
        })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
