//! # Application Errors
//!
//! Everything that can stop the CLI before or after pricing. Rejected quote
//! lines are not errors here; they are part of the printed sheet.

use std::path::PathBuf;

use glazier_core::{ConfigError, FormulaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse pricing config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid pricing config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("Failed to read quote requests: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

pub type AppResult<T> = Result<T, AppError>;
