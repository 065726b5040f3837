//! # Pricing Config Loading
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults           (empty tables, divisor 0.28)            │
//! │  2. pricing.toml                --config <path>, or the platform dir:   │
//! │                                   Linux   ~/.config/quote/pricing.toml  │
//! │                                   macOS   ~/Library/Application Support/│
//! │                                           com.glazier.quote/            │
//! │                                   Windows %APPDATA%\glazier\quote\      │
//! │  3. Environment                 GLAZIER_FORMULA_MODE                    │
//! │                                 GLAZIER_DIVISOR                         │
//! │                                 GLAZIER_MULTIPLIER                      │
//! │                                 GLAZIER_MINIMUM_SQ_FT                   │
//! │                                 GLAZIER_CONTRACTOR_DISCOUNT             │
//! │  4. validate()                  rejects broken snapshots up front       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use glazier_core::{FormulaMode, PricingConfiguration};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

pub const ENV_FORMULA_MODE: &str = "GLAZIER_FORMULA_MODE";
pub const ENV_DIVISOR: &str = "GLAZIER_DIVISOR";
pub const ENV_MULTIPLIER: &str = "GLAZIER_MULTIPLIER";
pub const ENV_MINIMUM_SQ_FT: &str = "GLAZIER_MINIMUM_SQ_FT";
pub const ENV_CONTRACTOR_DISCOUNT: &str = "GLAZIER_CONTRACTOR_DISCOUNT";

/// Loads the pricing snapshot from file and environment, then validates it.
///
/// An explicit path must exist. A missing file in the platform config
/// directory falls back to the built-in defaults.
pub fn load(config_path: Option<PathBuf>) -> AppResult<PricingConfiguration> {
    let mut config = match config_path {
        Some(path) if !path.exists() => return Err(AppError::ConfigNotFound(path)),
        Some(path) => read_file(&path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            path => {
                debug!(?path, "Config file not found, using defaults");
                PricingConfiguration::default()
            }
        },
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());

    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> AppResult<PricingConfiguration> {
    info!(?path, "Loading pricing config from file");
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

/// Parses a TOML pricing snapshot.
pub fn parse(contents: &str) -> AppResult<PricingConfiguration> {
    Ok(toml::from_str(contents)?)
}

/// Applies `GLAZIER_*` overrides read through `lookup`.
///
/// Unparseable values are logged and ignored.
pub fn apply_overrides<F>(config: &mut PricingConfiguration, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup(ENV_FORMULA_MODE) {
        match mode.parse::<FormulaMode>() {
            Ok(parsed) => {
                debug!(mode = %parsed, "Overriding formula mode from environment");
                config.formula.mode = parsed;
            }
            Err(e) => warn!(mode = %mode, error = %e, "Ignoring formula mode from environment"),
        }
    }

    if let Some(value) = number(&lookup, ENV_DIVISOR) {
        config.formula.divisor_value = value;
    }
    if let Some(value) = number(&lookup, ENV_MULTIPLIER) {
        config.formula.multiplier_value = value;
    }
    if let Some(value) = number(&lookup, ENV_MINIMUM_SQ_FT) {
        config.settings.minimum_billable_sq_ft = value;
    }
    if let Some(value) = number(&lookup, ENV_CONTRACTOR_DISCOUNT) {
        config.settings.contractor_discount_rate = value;
    }
}

fn number<F>(lookup: &F, name: &'static str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => {
            debug!(variable = name, value, "Overriding setting from environment");
            Some(value)
        }
        _ => {
            warn!(variable = name, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

/// Returns the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "glazier", "quote")
        .map(|dirs| dirs.config_dir().join("pricing.toml"))
}

// =============================================================================
// Unit Tests
// =============================================================================
